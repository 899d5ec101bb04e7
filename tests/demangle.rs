//! Demangle hook tests.
//!
//! The hook is process-wide, so everything touching it lives in this one
//! test binary and runs in a single test function.
//!
//! # Requirements Tested
//!
//! - DMG-001: The default hook shortens module paths
//! - DMG-002: A replaced hook affects display names and error messages
//! - DMG-003: Reset restores the default hook

use jsonv::serialization::{demangle, reset_demangle_function, set_demangle_function, TypeInfo};
use jsonv::{Formats, Value};

#[derive(Debug)]
struct Widget;

#[test]
fn dmg001_through_dmg003_hook_lifecycle() {
    // DMG-001
    assert_eq!(TypeInfo::of::<Vec<String>>().to_string(), "Vec<String>");
    assert_eq!(TypeInfo::of::<Widget>().display_name(), "Widget");
    assert!(TypeInfo::of::<Widget>().raw_name().ends_with("::Widget"));

    // DMG-002
    set_demangle_function(|name| format!("<{}>", name.rsplit("::").next().unwrap_or(name)));
    assert_eq!(demangle("a::b::C"), "<C>");
    assert_eq!(TypeInfo::of::<Widget>().to_string(), "<Widget>");
    let err = Formats::new().extract::<Widget>(&Value::Null).unwrap_err();
    assert_eq!(
        err.root_cause().to_string(),
        "Could not find extractor for type: <Widget>",
        "DMG-002: error messages use the hook"
    );
    assert_eq!(
        TypeInfo::of::<Widget>(),
        TypeInfo::of::<Widget>(),
        "DMG-002: identity is independent of the hook"
    );

    // DMG-003
    reset_demangle_function();
    assert_eq!(TypeInfo::of::<Widget>().to_string(), "Widget");
}
