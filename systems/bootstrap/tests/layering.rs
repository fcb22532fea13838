use toml::Value;

#[test]
fn bootstrap_depends_only_on_core_and_world() {
    let manifest: Value =
        toml::from_str(include_str!("../Cargo.toml")).expect("crate manifest parses");
    let dependencies = manifest
        .get("dependencies")
        .and_then(Value::as_table)
        .expect("dependency table present");

    let local: Vec<(&str, &str)> = dependencies
        .iter()
        .filter_map(|(name, spec)| {
            let path = spec.get("path")?.as_str()?;
            Some((name.as_str(), path))
        })
        .collect();

    assert_eq!(
        local,
        vec![
            ("cypher-town-core", "../../core"),
            ("cypher-town-world", "../../world"),
        ]
    );
}
