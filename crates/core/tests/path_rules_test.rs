use pretty_assertions::assert_eq;
use treeline_core::path;
use treeline_core::{Config, Error, MappingEntry, MappingTable, SearchPath};

#[test]
fn test_clean_absolute_paths_are_fixed_points() {
    for p in ["/", "/a", "/a/b", "/content/site/page.html", "/x/..y/.z"] {
        assert_eq!(path::normalize(p).unwrap().as_str(), p);
    }
}

#[test]
fn test_normalize_collapses_and_trims() {
    assert_eq!(path::normalize("//a///b/").unwrap().as_str(), "/a/b");
    assert_eq!(path::normalize("/a/./b/../c").unwrap().as_str(), "/a/c");
    assert_eq!(path::normalize("a/../../b").unwrap().as_str(), "../b");
    assert!(matches!(
        path::normalize("/a/../.."),
        Err(Error::InvalidPath { .. })
    ));
}

#[test]
fn test_deferred_parent_segments_revalidated_on_anchor() {
    assert_eq!(path::anchor("/a/b", "../../c").unwrap().as_str(), "/c");
    assert!(matches!(
        path::anchor("/a", "../../c"),
        Err(Error::InvalidPath { .. })
    ));
}

#[test]
fn test_rule_tables_from_config() {
    let config = Config::from_toml_str(
        r#"
        [resolver]
        search_path = ["/apps", "/libs"]

        [[resolver.mappings]]
        internal = "/content/site"
        external = "/site"

        [[resolver.mappings]]
        internal = "/content/site/en"
        external = "/en"
        "#,
    )
    .unwrap();

    let search_path = config.resolver.search_path().unwrap();
    assert_eq!(search_path, SearchPath::new(["/apps/", "/libs/"]).unwrap());

    let table = config.resolver.mapping_table().unwrap();
    assert_eq!(table.map("/content/site/page"), "/site/page");
    assert_eq!(table.map("/content/site/en/page"), "/en/page");
    assert_eq!(table.unmap("/en/page", None), "/content/site/en/page");
    assert_eq!(table.map("/content/sitemap"), "/content/sitemap");
}

#[test]
fn test_host_rules_only_apply_with_host() {
    let table = MappingTable::new([
        MappingEntry::new("/content/site", "/"),
        MappingEntry::new("/content/shop", "/").for_host("Shop.Example.com"),
    ])
    .unwrap();

    assert_eq!(table.unmap("/cart", None), "/content/site/cart");
    assert_eq!(
        table.unmap("/cart", Some("shop.example.com")),
        "/content/shop/cart"
    );
    assert_eq!(
        table.map_for_host("/content/shop/cart", Some("shop.example.com")),
        "/cart"
    );
    assert_eq!(table.map("/content/shop/cart"), "/content/shop/cart");
}
