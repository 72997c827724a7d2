use avp_remote::domain::catalog::CatalogView;
use avp_remote::domain::models::CatalogItem;
use avp_remote::domain::search::fuzzy_filter;

#[test]
fn fuzzy_filter_ranks_matches() {
    let names = ["holiday-2023.mp4", "beach.mp4", "birthday party.mkv"];

    let result = fuzzy_filter(&names, "bday");
    assert_eq!(result.first(), Some(&2));
    assert!(!result.contains(&0));
}

#[test]
fn empty_query_keeps_server_order() {
    let names = vec!["c.mp4".to_string(), "a.mp4".to_string(), "b.mp4".to_string()];
    assert_eq!(fuzzy_filter(&names, "  "), vec![0, 1, 2]);
}

#[test]
fn catalog_filter_narrows_and_resets_selection() {
    let mut view = CatalogView::new();
    view.set_items(
        ["intro.mp4", "outro.mp4", "interview.mkv"]
            .into_iter()
            .map(|name| CatalogItem {
                name: name.to_string(),
            })
            .collect(),
    );
    view.select(2);

    view.set_filter("mkv");
    assert_eq!(view.visible_len(), 1);
    assert_eq!(view.selected_index(), 0);
    assert_eq!(
        view.selected().map(|card| card.item.name.as_str()),
        Some("interview.mkv")
    );

    view.set_filter("");
    assert_eq!(view.visible_len(), 3);
    assert_eq!(view.len(), 3);
}
