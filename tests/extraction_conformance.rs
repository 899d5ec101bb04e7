//! Extraction and serialization behavior of built formats.
//!
//! # Requirements Tested
//!
//! - EXT-001: Failures carry the path of the offending sub-value
//! - EXT-002: Version gating with since/until/before/after
//! - EXT-003: Optional semantics
//! - EXT-004: Member options
//! - EXT-005: Polymorphic dispatch
//! - EXT-006: Object key uniqueness
//! - EXT-007: Contexts

use pretty_assertions::assert_eq;

use jsonv::serialization::{
    ExtraKeys, ExtractionContext, Formats, FormatsBuilder, KeyedSubtypeAction, Polymorphic,
    SerializationContext, Version,
};
use jsonv::{Error, Value};

// ============================================================================
// EXT-001: Path Correctness
// ============================================================================

#[derive(Debug, Default, PartialEq)]
struct Holder {
    a: Vec<i64>,
}

fn holder_formats() -> Formats {
    FormatsBuilder::new()
        .type_adapter::<Holder, _>(|t| {
            t.member("a", |h: &Holder| &h.a, |h: &mut Holder| &mut h.a);
        })
        .register_container::<Vec<i64>>()
        .compose_checked([Formats::defaults()])
        .unwrap()
}

#[test]
fn ext001_element_path() {
    let value = jsonv::text::parse_str(r#"{"a":[1,"x",3]}"#).unwrap();
    let err = holder_formats().extract::<Holder>(&value).unwrap_err();
    assert_eq!(err.code(), 120, "EXT-001: must be an extraction error");
    assert_eq!(
        err.path().map(ToString::to_string).as_deref(),
        Some(".a[1]"),
        "EXT-001: path must point at the bad element"
    );
    assert_eq!(err.root_cause().code(), 100, "EXT-001: cause is a kind error");
}

#[test]
fn ext001_success() {
    let value = jsonv::text::parse_str(r#"{"a":[1,2,3]}"#).unwrap();
    let holder: Holder = holder_formats().extract(&value).unwrap();
    assert_eq!(holder, Holder { a: vec![1, 2, 3] });
}

#[test]
fn ext001_missing_key_path() {
    let err = holder_formats()
        .extract::<Holder>(&Value::empty_object())
        .unwrap_err();
    assert_eq!(err.path().map(ToString::to_string).as_deref(), Some(".a"));
    assert!(matches!(err.root_cause(), Error::NotFound { .. }));
}

// ============================================================================
// EXT-002: Version Gating
// ============================================================================

#[derive(Debug, Default, PartialEq)]
struct Gated {
    always: i64,
    window: i64,
}

fn gated_formats() -> Formats {
    FormatsBuilder::new()
        .type_adapter::<Gated, _>(|t| {
            t.member("always", |g: &Gated| &g.always, |g: &mut Gated| &mut g.always);
            t.member("window", |g: &Gated| &g.window, |g: &mut Gated| &mut g.window)
                .since(2)
                .until(5);
        })
        .extend(Formats::defaults())
        .build()
        .unwrap()
}

fn extract_at_version(formats: &Formats, value: &Value, version: u32) -> jsonv::Result<Gated> {
    ExtractionContext::new(formats)
        .with_version(version)
        .extract(value)
}

#[test]
fn ext002_skipped_outside_window() {
    let formats = gated_formats();
    let value = Value::object([("always", 1)]);
    for version in [1, 5] {
        let gated = extract_at_version(&formats, &value, version)
            .unwrap_or_else(|e| panic!("EXT-002: version {version} must skip the member: {e}"));
        assert_eq!(gated, Gated { always: 1, window: 0 });
    }
}

#[test]
fn ext002_required_inside_window() {
    let formats = gated_formats();
    let err = extract_at_version(&formats, &Value::object([("always", 1)]), 3).unwrap_err();
    assert_eq!(err.path().map(ToString::to_string).as_deref(), Some(".window"));

    let value = Value::object([("always", 1), ("window", 9)]);
    assert_eq!(
        extract_at_version(&formats, &value, 3).unwrap(),
        Gated { always: 1, window: 9 }
    );
}

#[test]
fn ext002_ignored_outside_window_even_when_present() {
    let formats = gated_formats();
    let value = Value::object([("always", 1), ("window", 9)]);
    assert_eq!(extract_at_version(&formats, &value, 7).unwrap().window, 0);
}

#[test]
fn ext002_empty_version_applies_everything() {
    let formats = gated_formats();
    assert!(formats.extract::<Gated>(&Value::object([("always", 1)])).is_err());
}

#[test]
fn ext002_serialization_is_gated() {
    let formats = gated_formats();
    let gated = Gated { always: 1, window: 2 };
    let old = SerializationContext::new(&formats)
        .with_version(Version::new(1, 5))
        .to_json(&gated)
        .unwrap();
    assert_eq!(old, Value::object([("always", 1)]));
    let current = SerializationContext::new(&formats)
        .with_version(Version::new(4, 0))
        .to_json(&gated)
        .unwrap();
    assert_eq!(current, Value::object([("always", 1), ("window", 2)]));
}

#[derive(Debug, Default, PartialEq)]
struct Strict {
    n: i64,
}

#[test]
fn ext002_after_and_before_are_exclusive() {
    let formats = FormatsBuilder::new()
        .type_adapter::<Strict, _>(|t| {
            t.member("n", |s: &Strict| &s.n, |s: &mut Strict| &mut s.n)
                .after((1, 0))
                .before((2, 0));
        })
        .extend(Formats::defaults())
        .build()
        .unwrap();
    let empty = Value::empty_object();
    let at = |v: (u32, u32)| {
        ExtractionContext::new(&formats)
            .with_version(v)
            .extract::<Strict>(&empty)
    };
    assert!(at((1, 0)).is_ok(), "version 1.0 is not after 1.0");
    assert!(at((1, 5)).is_err(), "version 1.5 is inside the window");
    assert!(at((2, 0)).is_ok(), "version 2.0 is not before 2.0");
}

// ============================================================================
// EXT-003: Optional Semantics
// ============================================================================

fn optional_formats() -> Formats {
    FormatsBuilder::new()
        .register_optional::<i64>()
        .compose_checked([Formats::defaults()])
        .unwrap()
}

#[test]
fn ext003_null_is_empty() {
    assert_eq!(optional_formats().extract::<Option<i64>>(&Value::Null).unwrap(), None);
}

#[test]
fn ext003_value_is_present() {
    assert_eq!(
        optional_formats().extract::<Option<i64>>(&Value::Integer(3)).unwrap(),
        Some(3)
    );
}

#[test]
fn ext003_empty_serializes_to_null() {
    assert_eq!(optional_formats().to_json(&None::<i64>).unwrap(), Value::Null);
    assert_eq!(optional_formats().to_json(&Some(4i64)).unwrap(), Value::Integer(4));
}

// ============================================================================
// EXT-004: Member Options
// ============================================================================

#[derive(Debug, Default, Clone, PartialEq)]
struct Account {
    id: u32,
    name: String,
    nickname: Option<String>,
    balance: i64,
}

fn account_formats(extra: ExtraKeys) -> Formats {
    FormatsBuilder::new()
        .type_adapter::<Account, _>(|t| {
            t.member("id", |a: &Account| &a.id, |a: &mut Account| &mut a.id)
                .check_input(|id| {
                    if *id == 0 {
                        Err(Error::custom("id must be positive"))
                    } else {
                        Ok(())
                    }
                });
            t.member("name", |a: &Account| &a.name, |a: &mut Account| &mut a.name)
                .alternate_name("full_name")
                .alternate_name("fullName");
            t.member("nickname", |a: &Account| &a.nickname, |a: &mut Account| &mut a.nickname)
                .optional()
                .encode_if(|_, nickname| nickname.is_some());
            t.member("balance", |a: &Account| &a.balance, |a: &mut Account| &mut a.balance)
                .default_value(100)
                .default_on_null(true);
            t.on_extract_extra_keys(extra);
        })
        .register_optional::<String>()
        .compose_checked([Formats::defaults()])
        .unwrap()
}

#[test]
fn ext004_alternate_names_in_order() {
    let formats = account_formats(ExtraKeys::Ignore);
    let value = Value::object([
        ("id", Value::Integer(1)),
        ("fullName", Value::from("second")),
        ("full_name", Value::from("first")),
    ]);
    let account: Account = formats.extract(&value).unwrap();
    assert_eq!(account.name, "first", "EXT-004: alternates are tried in declaration order");
}

#[test]
fn ext004_defaults() {
    let formats = account_formats(ExtraKeys::Ignore);
    let account: Account = formats
        .extract(&Value::object([("id", Value::Integer(1)), ("name", Value::from("a"))]))
        .unwrap();
    assert_eq!(account.balance, 100);
    assert_eq!(account.nickname, None);

    let account: Account = formats
        .extract(&Value::object([
            ("id", Value::Integer(1)),
            ("name", Value::from("a")),
            ("balance", Value::Null),
        ]))
        .unwrap();
    assert_eq!(account.balance, 100, "EXT-004: default_on_null applies the default");
}

#[test]
fn ext004_check_input_failure_is_tagged() {
    let formats = account_formats(ExtraKeys::Ignore);
    let err = formats
        .extract::<Account>(&Value::object([("id", Value::Integer(0)), ("name", Value::from("a"))]))
        .unwrap_err();
    assert_eq!(err.path().map(ToString::to_string).as_deref(), Some(".id"));
    assert_eq!(err.root_cause().to_string(), "id must be positive");
}

#[test]
fn ext004_encode_if() {
    let formats = account_formats(ExtraKeys::Ignore);
    let account = Account {
        id: 7,
        name: "n".to_string(),
        nickname: None,
        balance: 1,
    };
    let value = formats.to_json(&account).unwrap();
    assert_eq!(
        value,
        Value::object([
            ("id", Value::Integer(7)),
            ("name", Value::from("n")),
            ("balance", Value::Integer(1)),
        ])
    );
    let with_nickname = Account {
        nickname: Some("nick".to_string()),
        ..account
    };
    let value = formats.to_json(&with_nickname).unwrap();
    assert_eq!(value.get("nickname"), Some(&Value::from("nick")));
    assert_eq!(formats.extract::<Account>(&value).unwrap(), with_nickname);
}

#[test]
fn ext004_extra_keys_fail_lists_unknown_keys() {
    let formats = account_formats(ExtraKeys::Fail);
    let value = Value::object([
        ("id", Value::Integer(1)),
        ("full_name", Value::from("a")),
        ("colour", Value::from("red")),
    ]);
    let err = formats.extract::<Account>(&value).unwrap_err();
    assert!(
        err.to_string().ends_with("Found extra key(s) in value: colour"),
        "unexpected message: {err}"
    );
}

// ============================================================================
// EXT-005: Polymorphic Dispatch
// ============================================================================

trait Animal: Polymorphic {
    fn speak(&self) -> String;
}

#[derive(Debug, Default, PartialEq)]
struct Dog {
    bark: String,
}

#[derive(Debug, Default, PartialEq)]
struct Cat {
    meow: String,
}

impl Animal for Dog {
    fn speak(&self) -> String {
        self.bark.clone()
    }
}

impl Animal for Cat {
    fn speak(&self) -> String {
        self.meow.clone()
    }
}

fn zoo_formats(action: Option<KeyedSubtypeAction>) -> Formats {
    FormatsBuilder::new()
        .type_adapter::<Dog, _>(|t| {
            t.member("bark", |d: &Dog| &d.bark, |d: &mut Dog| &mut d.bark);
        })
        .type_adapter::<Cat, _>(|t| {
            t.member("meow", |c: &Cat| &c.meow, |c: &mut Cat| &mut c.meow);
        })
        .polymorphic_type::<Box<dyn Animal>, _>(|p| {
            match action {
                None => {
                    p.add_subtype(|v| v.contains_key("bark"), |d: Dog| -> Box<dyn Animal> { Box::new(d) })?
                        .add_subtype(|v| v.contains_key("meow"), |c: Cat| -> Box<dyn Animal> { Box::new(c) })?;
                }
                Some(action) => {
                    p.add_subtype_keyed("type", "dog", action, |d: Dog| -> Box<dyn Animal> { Box::new(d) })?
                        .add_subtype_keyed("type", "cat", action, |c: Cat| -> Box<dyn Animal> { Box::new(c) })?;
                }
            }
            Ok(())
        })
        .compose_checked([Formats::defaults()])
        .unwrap()
}

#[test]
fn ext005_first_match_wins() {
    let formats = zoo_formats(None);
    let both = Value::object([("bark", "woof"), ("meow", "purr")]);
    let animal: Box<dyn Animal> = formats.extract(&both).unwrap();
    assert_eq!(animal.speak(), "woof", "EXT-005: Dog registered first must win");

    let cat = Value::object([("meow", "purr")]);
    let animal: Box<dyn Animal> = formats.extract(&cat).unwrap();
    assert_eq!(animal.speak(), "purr");
}

#[test]
fn ext005_no_match_is_no_extractor() {
    let formats = zoo_formats(None);
    let err = formats
        .extract::<Box<dyn Animal>>(&Value::object([("moo", "x")]))
        .err().unwrap();
    assert!(
        matches!(err.root_cause(), Error::NoExtractor { .. }),
        "EXT-005: unmatched input must fail with no_extractor, got {err:?}"
    );
}

#[test]
fn ext005_serializes_dynamic_type() {
    let formats = zoo_formats(None);
    let animal: Box<dyn Animal> = Box::new(Cat {
        meow: "mew".to_string(),
    });
    assert_eq!(formats.to_json(&animal).unwrap(), Value::object([("meow", "mew")]));
}

#[test]
fn ext005_keyed_insert_round_trip() {
    let formats = zoo_formats(Some(KeyedSubtypeAction::Insert));
    let animal: Box<dyn Animal> = Box::new(Dog {
        bark: "arf".to_string(),
    });
    let value = formats.to_json(&animal).unwrap();
    assert_eq!(value, Value::object([("type", "dog"), ("bark", "arf")]));
    let back: Box<dyn Animal> = formats.extract(&value).unwrap();
    assert_eq!(back.speak(), "arf");
    let dog = Polymorphic::as_any(&*back).downcast_ref::<Dog>();
    assert_eq!(dog.map(|d| d.bark.as_str()), Some("arf"));
}

#[test]
fn ext005_keyed_check_rejects_missing_discriminator() {
    let formats = zoo_formats(Some(KeyedSubtypeAction::Check));
    let animal: Box<dyn Animal> = Box::new(Dog::default());
    let err = formats.to_json(&animal).unwrap_err();
    assert_eq!(err.code(), 130);
}

#[derive(Default)]
struct Pen {
    animals: Vec<Box<dyn Animal>>,
}

#[test]
fn ext005_validation_path_includes_enclosing_members() {
    let formats = FormatsBuilder::new()
        .type_adapter::<Pen, _>(|t| {
            t.member("animals", |p: &Pen| &p.animals, |p: &mut Pen| &mut p.animals);
        })
        .register_container::<Vec<Box<dyn Animal>>>()
        .compose_checked([zoo_formats(Some(KeyedSubtypeAction::Check))])
        .unwrap();
    let pen = Pen {
        animals: vec![Box::new(Dog {
            bark: "arf".to_string(),
        })],
    };
    let err = formats.to_json(&pen).unwrap_err();
    assert_eq!(err.code(), 130);
    assert_eq!(
        err.path().map(ToString::to_string).as_deref(),
        Some(".animals[0].type"),
        "EXT-005: validation failures must point into the enclosing tree"
    );
}

// ============================================================================
// EXT-006: Object Key Uniqueness
// ============================================================================

#[test]
fn ext006_last_write_wins() {
    let value = Value::object([("k", 1), ("k", 2)]);
    assert_eq!(value.len().unwrap(), 1);
    assert_eq!(value.get("k"), Some(&Value::Integer(2)));
}

#[test]
fn ext006_parser_last_write_wins() {
    let value = jsonv::text::parse_str(r#"{"k":1,"j":0,"k":2}"#).unwrap();
    assert_eq!(value, Value::object([("k", 2), ("j", 0)]));
    let keys: Vec<&String> = value.as_object().unwrap().keys().collect();
    assert_eq!(keys, ["k", "j"], "EXT-006: first position is kept");
}

// ============================================================================
// EXT-007: Contexts
// ============================================================================

#[derive(Debug, Default, PartialEq)]
struct Scaled(i64);

#[test]
fn ext007_user_data_reaches_custom_extractors() {
    let formats = FormatsBuilder::new()
        .register_extractor(jsonv::serialization::make_extractor(|ctx, from| {
            let factor = ctx.user_data::<i64>().copied().unwrap_or(1);
            Ok(Scaled(from.as_integer()? * factor))
        }))
        .build()
        .unwrap();
    let factor = 10i64;
    let scaled: Scaled = ExtractionContext::new(&formats)
        .with_user_data(&factor)
        .extract(&Value::Integer(4))
        .unwrap();
    assert_eq!(scaled, Scaled(40));
    assert_eq!(formats.extract::<Scaled>(&Value::Integer(4)).unwrap(), Scaled(4));
}

#[test]
fn ext007_starting_path_prefixes_errors() {
    let formats = holder_formats();
    let ctx = ExtractionContext::new(&formats).with_path(jsonv::Path::parse(".outer[2]").unwrap());
    let err = ctx
        .extract::<Holder>(&Value::object([("a", Value::array([Value::Null]))]))
        .unwrap_err();
    assert_eq!(err.path().map(ToString::to_string).as_deref(), Some(".outer[2].a[0]"));
}
