//! Reading caveat sets the way capability descriptors do.

use ipld_core::ipld::Ipld;
use pretty_assertions::assert_eq;
use testresult::TestResult;
use warrant_schema::{Fields, Reader, Schema, SchemaError};

fn nb(entries: impl IntoIterator<Item = (&'static str, Ipld)>) -> Fields {
    entries
        .into_iter()
        .map(|(key, value)| (key.to_string(), value))
        .collect()
}

fn store_add() -> Schema {
    Schema::structure([
        ("link", Schema::link().optional()),
        ("size", Schema::integer().optional()),
    ])
}

#[test]
fn absent_caveats_stay_absent() -> TestResult {
    let read = store_add().read(&nb([]))?;
    assert_eq!(read, Fields::new());
    Ok(())
}

#[test]
fn undeclared_caveats_are_dropped() -> TestResult {
    let read = store_add().read(&nb([
        ("size", Ipld::Integer(10)),
        ("origin", Ipld::String("anywhere".into())),
    ]))?;
    assert_eq!(read, nb([("size", Ipld::Integer(10))]));
    Ok(())
}

#[test]
fn malformed_caveats_name_the_field() {
    let error = store_add()
        .read(&nb([("link", Ipld::String("bafy".into()))]))
        .unwrap_err();
    assert_eq!(
        error.to_string(),
        "Object contains invalid field \"link\":\n  Expected link to be a CID instead of string"
    );
    assert!(matches!(error, SchemaError::Field { ref at, .. } if at == "link"));
}

#[test]
fn wildcard_or_value_caveats() -> TestResult {
    let schema = Schema::structure([("path", Schema::literal("*").or(Schema::string().starts_with("/")))]);
    assert!(schema.read(&nb([("path", Ipld::String("*".into()))])).is_ok());
    assert!(schema.read(&nb([("path", Ipld::String("/tmp".into()))])).is_ok());
    assert!(schema.read(&nb([("path", Ipld::String("tmp".into()))])).is_err());
    Ok(())
}
