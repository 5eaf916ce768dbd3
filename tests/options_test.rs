use rs_recipe_miner::{discover, Options, PullbackOptions};

#[test]
fn options_default_values_are_sensible() {
    let options = Options::default();
    assert_eq!(options.min_occurrences, vec![5, 10, 20]);
    assert!(!options.only_varying_fields);
    assert!(options.require_string.is_none());
    assert!(!options.detail_mode);
    assert!(options.url.is_none());
    assert!(options.pruning);
    assert!(options.find_next);
    assert!(options.pullback.enabled);
    assert_eq!(options.pullback.preferred_tag, "div");
}

#[test]
fn options_struct_update_syntax_overrides_selected_fields_only() {
    let options = Options {
        only_varying_fields: true,
        url: Some("https://example.com/list".to_string()),
        ..Options::default()
    };

    assert!(options.only_varying_fields);
    assert!(options.pruning);
    assert_eq!(options.url.as_deref(), Some("https://example.com/list"));
}

#[test]
fn options_deserialize_from_partial_json() {
    let options: Options = serde_json::from_str(
        r#"{
            "min_occurrences": [8],
            "require_string": "Soumission",
            "pullback": { "preferred_tag": "article" }
        }"#,
    )
    .unwrap();

    assert_eq!(options.min_occurrences, vec![8]);
    assert_eq!(options.require_string.as_deref(), Some("Soumission"));
    assert_eq!(options.pullback.preferred_tag, "article");
    assert!(options.pullback.enabled);
    assert!(options.is_interesting_attribute("HREF"));
    assert!(!options.is_interesting_attribute("style"));
}

#[test]
fn interesting_attributes_drive_candidates() {
    let items: String = (1..=5)
        .map(|i| format!(r#"<div class="c"><b>Item {i}</b><span data-id="{i}">x</span></div>"#))
        .collect();
    let html = format!("<html><body>{items}</body></html>");

    let field_count = |options: &Options| {
        let discovery = discover(&html, options).unwrap();
        discovery.recipes.values().next().unwrap().recipe.fields.len()
    };

    let base = Options {
        min_occurrences: vec![5],
        only_varying_fields: true,
        ..Options::default()
    };
    let mut with_data_id = base.clone();
    with_data_id.interesting_attributes.push("data-id".to_string());

    assert_eq!(field_count(&base), 1);
    assert_eq!(field_count(&with_data_id), 2);
}

#[test]
fn disabling_pullback_keeps_structural_root() {
    let cards: String = (1..=5)
        .map(|i| {
            format!(
                r#"<article class="card"><div class="body"><h3>T{i}</h3><p>D{i}</p></div></article>"#
            )
        })
        .collect();
    let html = format!("<html><body>{cards}</body></html>");

    let item = |pullback: PullbackOptions| {
        let options = Options {
            min_occurrences: vec![5],
            pullback,
            ..Options::default()
        };
        let discovery = discover(&html, &options).unwrap();
        discovery.recipes.values().next().unwrap().recipe.item.to_string()
    };

    assert_eq!(item(PullbackOptions::default()), "body > article.card");
    assert_eq!(
        item(PullbackOptions {
            enabled: false,
            ..PullbackOptions::default()
        }),
        "body > article.card > div.body"
    );
}
