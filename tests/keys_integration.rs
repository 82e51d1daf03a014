//! Integration tests for key creation.
//!
//! These use explicit contexts and never touch the process default.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use cache_helper::keys::hashed_cache_key;
use cache_helper::{
    call_args, function_id, CacheContext, CacheHelperError, Cacheable, Cached, CachedMethod,
    FunctionId, KeyPart, MemoryBackend, Timeout,
};

struct Fruit {
    name: &'static str,
}

impl fmt::Display for Fruit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MyNameIs{}", self.name)
    }
}

impl Cacheable for Fruit {
    fn cache_helper_key(&self) -> KeyPart {
        KeyPart::display(self)
    }
}

struct Vegetable {
    name: &'static str,
}

impl Cacheable for Vegetable {
    fn cache_helper_key(&self) -> KeyPart {
        KeyPart::from(self.name)
    }
}

struct Meat {
    name: &'static str,
    grams_protein: u32,
}

impl Cacheable for Meat {
    fn cache_helper_key(&self) -> KeyPart {
        KeyPart::Value(format!("{}:{}", self.name, self.grams_protein))
    }
}

fn context() -> Arc<CacheContext> {
    Arc::new(CacheContext::new(Arc::new(MemoryBackend::new(1000))))
}

fn fruit(name: &'static str) -> Fruit {
    Fruit { name }
}

fn take_then_give_back_id() -> FunctionId {
    FunctionId::method::<Fruit>("take_then_give_back")
}

#[test]
fn test_same_method_name_different_type() {
    let fruit_method = CachedMethod::new::<Fruit>("take_then_give_back", Timeout::Never);
    let vegetable_method = CachedMethod::new::<Vegetable>("take_then_give_back", Timeout::Never);
    let context = context();
    let fruit_method = fruit_method.with_context(context.clone());
    let vegetable_method = vegetable_method.with_context(context);

    let apple = fruit("Apple");
    let celery = Vegetable { name: "Celery" };
    let cherry = fruit("Cherry");

    let fruit_key = fruit_method.bind(&apple).cache_key(&call_args![cherry]).unwrap();
    let vegetable_key = vegetable_method
        .bind(&celery)
        .cache_key(&call_args![cherry])
        .unwrap();

    assert_ne!(fruit_key.function_key, vegetable_key.function_key);
    assert_ne!(fruit_key.backend_key, vegetable_key.backend_key);
}

#[test]
fn test_same_class_method_name_different_type() {
    let context = context();
    let fruit_fn = Cached::class_method::<Fruit>("add_sweet_letter", Timeout::Never)
        .with_context(context.clone());
    let vegetable_fn = Cached::class_method::<Vegetable>("add_sweet_letter", Timeout::Never)
        .with_context(context);

    let a = fruit("a");
    assert_ne!(
        fruit_fn.cache_key(&call_args![a]).unwrap(),
        vegetable_fn.cache_key(&call_args![a]).unwrap()
    );
}

#[test]
fn test_same_static_method_name_different_type() {
    let context = context();
    let fruit_fn =
        Cached::static_method::<Fruit>("static_method", Timeout::Never).with_context(context.clone());
    let vegetable_fn =
        Cached::static_method::<Vegetable>("static_method", Timeout::Never).with_context(context);

    assert_ne!(
        fruit_fn.cache_key(&call_args!["a"]).unwrap(),
        vegetable_fn.cache_key(&call_args!["a"]).unwrap()
    );
}

#[test]
fn test_same_function_name_free_and_associated() {
    let context = context();
    let free_fn = Cached::function(function_id!("foo"), Timeout::Never).with_context(context.clone());
    let associated_fn =
        Cached::static_method::<Fruit>("foo", Timeout::Never).with_context(context);

    assert_ne!(
        free_fn.cache_key(&call_args![1, 2]).unwrap(),
        associated_fn.cache_key(&call_args![1, 2]).unwrap()
    );
}

#[test]
fn test_args_use_display_form() {
    let method = CachedMethod::with_id(take_then_give_back_id(), Timeout::Never)
        .with_context(context());
    let apple = fruit("Apple");
    let cherry = fruit("Cherry");

    let key = method.bind(&apple).cache_key(&call_args![cherry]).unwrap();
    assert_eq!(
        key.function_key,
        format!(
            "{}::take_then_give_back;MyNameIsApple,MyNameIsCherry;",
            std::any::type_name::<Fruit>()
        )
    );
}

#[test]
fn test_map_args() {
    let method = CachedMethod::with_id(take_then_give_back_id(), Timeout::Never)
        .with_context(context());
    let apple = fruit("Apple");

    let mut map: HashMap<KeyPart, KeyPart> = HashMap::new();
    map.insert(1_i32.cache_helper_key(), fruit("Cherry").cache_helper_key());
    map.insert("string".cache_helper_key(), "ay carambe".cache_helper_key());

    let key = method.bind(&apple).cache_key(&call_args![map]).unwrap();
    assert_eq!(
        key.function_key,
        format!(
            "{}::take_then_give_back;MyNameIsApple,{{1:MyNameIsCherry,string:ay carambe}};",
            std::any::type_name::<Fruit>()
        )
    );
}

#[test]
fn test_set_args() {
    let method = CachedMethod::with_id(take_then_give_back_id(), Timeout::Never)
        .with_context(context());
    let apple = fruit("Apple");

    let set: HashSet<KeyPart> = [fruit("Cherry").cache_helper_key(), KeyPart::from("Apple")]
        .into_iter()
        .collect();

    let key = method.bind(&apple).cache_key(&call_args![set]).unwrap();
    assert_eq!(
        key.function_key,
        format!(
            "{}::take_then_give_back;MyNameIsApple,{{Apple,MyNameIsCherry}};",
            std::any::type_name::<Fruit>()
        )
    );
}

#[test]
fn test_list_args() {
    let method = CachedMethod::with_id(take_then_give_back_id(), Timeout::Never)
        .with_context(context());
    let apple = fruit("Apple");

    let key = method
        .bind(&apple)
        .cache_key(&call_args![vec![fruit("Cherry")]])
        .unwrap();
    assert_eq!(
        key.function_key,
        format!(
            "{}::take_then_give_back;MyNameIsApple,[MyNameIsCherry];",
            std::any::type_name::<Fruit>()
        )
    );
}

#[test]
fn test_nested_args_over_max_depth() {
    let context = context();
    let cached = Cached::function(function_id!("nested"), Timeout::Never).with_context(context);
    let nested = vec![vec![vec![1]]];

    let err = cached.cache_key(&call_args![nested]).unwrap_err();
    assert!(matches!(err, CacheHelperError::KeyCreation(_)));

    // The wrapped closure never runs when no key can be built
    let result: Result<i64, CacheHelperError> =
        cached.try_call(&call_args![nested], || panic!("must not run"));
    assert!(matches!(result, Err(CacheHelperError::KeyCreation(_))));
}

#[test]
fn test_max_depth_is_configurable() {
    let deep = Arc::new(CacheContext::new(Arc::new(MemoryBackend::new(10))).with_max_depth(3));
    let cached = Cached::function(function_id!("nested"), Timeout::Never).with_context(deep);

    let key = cached.cache_key(&call_args![vec![vec![vec![1]]]]).unwrap();
    assert!(key.function_key.ends_with(";[[[1]]];"));
}

#[test]
fn test_cacheable_key_is_used() {
    let context = context();
    let cached =
        Cached::static_method::<Meat>("grams_protein", Timeout::Never).with_context(context.clone());
    let chicken = Meat {
        name: "chicken",
        grams_protein: 20,
    };

    let grams: u32 = cached
        .call(&call_args![chicken], || chicken.grams_protein)
        .unwrap();
    assert_eq!(grams, 20);

    let key = cached.cache_key(&call_args![chicken]).unwrap();
    assert!(key.function_key.contains("chicken\\:20"));
    assert!(context.backend().contains_key(&key.backend_key).unwrap());
}

#[test]
fn test_long_arguments_hash_to_fixed_length() {
    let context = context();
    let cached = Cached::function(function_id!("long"), Timeout::Never).with_context(context.clone());
    let long = "a".repeat(10_000);

    let value: usize = cached.call(&call_args![long], || long.len()).unwrap();
    assert_eq!(value, 10_000);

    let key = cached.cache_key(&call_args![long]).unwrap();
    assert_eq!(key.backend_key.len(), 64);
    assert_eq!(key.backend_key, hashed_cache_key(&key.function_key));
    assert!(context.backend().contains_key(&key.backend_key).unwrap());
}

#[test]
fn test_key_prefix_is_prepended() {
    let context = Arc::new(
        CacheContext::new(Arc::new(MemoryBackend::new(10))).with_key_prefix("app:"),
    );
    let cached = Cached::function(function_id!("prefixed"), Timeout::Never).with_context(context);

    let key = cached.cache_key(&call_args![1]).unwrap();
    assert!(key.backend_key.starts_with("app:"));
    assert_eq!(key.backend_key.len(), "app:".len() + 64);
}

#[test]
fn test_empty_collections_do_not_share_entries() {
    let len = Cached::function(function_id!("len"), Timeout::Never).with_context(context());

    let empty: usize = len
        .call(&call_args![Vec::<String>::new()], || 0)
        .unwrap();
    let holding_empty: usize = len
        .call(&call_args![vec![String::new()]], || 1)
        .unwrap();
    assert_eq!((empty, holding_empty), (0, 1));

    let empty_set: HashSet<String> = HashSet::new();
    let set_of_empty: HashSet<String> = [String::new()].into_iter().collect();
    assert_ne!(
        len.cache_key(&call_args![empty_set]).unwrap(),
        len.cache_key(&call_args![set_of_empty]).unwrap()
    );
}

#[test]
fn test_empty_string_arg_does_not_share_entry_with_no_args() {
    let len = Cached::function(function_id!("len"), Timeout::Never).with_context(context());

    let no_args: usize = len.call(&call_args![], || 0).unwrap();
    let empty_arg: usize = len.call(&call_args![""], || 1).unwrap();
    assert_eq!((no_args, empty_arg), (0, 1));
    assert!(len
        .cache_key(&call_args![""])
        .unwrap()
        .function_key
        .ends_with(";'';"));
}

#[test]
fn test_kwarg_name_cannot_pass_for_other_kwargs() {
    let len = Cached::function(function_id!("len"), Timeout::Never).with_context(context());
    let spliced = call_args![].kwarg("a=1,b", &2);
    let separate = call_args![; a = 1, b = 2];

    let first: usize = len.call(&spliced, || 0).unwrap();
    let second: usize = len.call(&separate, || 1).unwrap();
    assert_eq!((first, second), (0, 1));
    assert_ne!(
        len.cache_key(&spliced).unwrap().function_key,
        len.cache_key(&separate).unwrap().function_key
    );
}
