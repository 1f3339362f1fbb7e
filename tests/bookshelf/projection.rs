use bookshelf::{
    BookFields, Cover, EmptyState, FilterState, MonthFilter, ReadingStatus, RecordStore,
    StatusFilter, ViewEvent,
};

use crate::support::{attached_shelf, record_events, titles};

#[test]
fn newer_month_comes_first_regardless_of_creation_order() {
    let (store, _, shelf) = attached_shelf();
    store
        .insert(BookFields::new("February", "A").with_month("2025-02"))
        .unwrap();
    store
        .insert(BookFields::new("January", "B").with_month("2025-01"))
        .unwrap();

    // Snapshot order is newest-created first; the projection reorders by month.
    assert_eq!(store.snapshot().unwrap().books()[0].title(), "January");
    assert_eq!(titles(&shelf.books().unwrap()), vec!["February", "January"]);
}

#[test]
fn search_matches_title_case_insensitively() {
    let (store, _, shelf) = attached_shelf();
    for fields in bookshelf::sample_books() {
        store.insert(fields).unwrap();
    }

    shelf.set_query("chemistry").unwrap();
    assert_eq!(titles(&shelf.books().unwrap()), vec!["Lessons in Chemistry"]);

    shelf.set_query("  FREIDA ").unwrap();
    assert_eq!(titles(&shelf.books().unwrap()), vec!["The Housemaid"]);

    shelf.set_query("thriller").unwrap();
    assert_eq!(titles(&shelf.books().unwrap()), vec!["The Housemaid"]);
}

#[test]
fn finished_filter_excludes_other_statuses() {
    let (store, _, shelf) = attached_shelf();
    store
        .insert(BookFields::new("Done", "A").with_status(ReadingStatus::Finished))
        .unwrap();
    store
        .insert(BookFields::new("Now", "B").with_status(ReadingStatus::Reading))
        .unwrap();
    store
        .insert(BookFields::new("Later", "C").with_status(ReadingStatus::ToRead))
        .unwrap();

    shelf.set_status_filter("finished").unwrap();
    assert_eq!(titles(&shelf.books().unwrap()), vec!["Done"]);

    shelf.set_status_filter("all").unwrap();
    assert_eq!(shelf.books().unwrap().len(), 3);
}

#[test]
fn projection_is_an_ordered_subset_and_idempotent() {
    let (store, _, shelf) = attached_shelf();
    let months = ["2024-12", "2025-03", "", "2025-01", "2025-03", "2024-07"];
    for (i, month) in months.iter().enumerate() {
        let status = if i % 2 == 0 {
            ReadingStatus::Finished
        } else {
            ReadingStatus::Reading
        };
        store
            .insert(
                BookFields::new(format!("Book {i}"), "Author")
                    .with_month(*month)
                    .with_status(status),
            )
            .unwrap();
    }

    let filters = [
        FilterState::new(),
        FilterState::new().with_status("finished"),
        FilterState::new().with_month("2025-03"),
        FilterState::new().with_query("book 1"),
    ];
    let cached = store.snapshot().unwrap();

    for filter in filters {
        shelf.set_filter(filter.clone()).unwrap();
        let first = shelf.books().unwrap();
        assert_eq!(first, shelf.books().unwrap());

        for book in &first {
            assert!(cached.get(&book.id).is_some());
            assert!(filter.matches(book));
        }
        for pair in first.windows(2) {
            assert!(pair[0].month() >= pair[1].month());
        }
        let expected = cached.books().iter().filter(|b| filter.matches(b)).count();
        assert_eq!(first.len(), expected);
    }
}

#[test]
fn created_record_renders_its_fields() {
    let (store, _, shelf) = attached_shelf();
    let id = store
        .insert(
            BookFields::new("Piranesi", "Susanna Clarke")
                .with_rating(3.5)
                .with_genre("Fantasy")
                .with_status(ReadingStatus::Finished)
                .with_month("2025-02")
                .with_cover("https://covers.example/piranesi.jpg")
                .with_review("Strange and lovely."),
        )
        .unwrap();

    let grid = shelf.render().unwrap();
    assert_eq!(grid.cards.len(), 1);
    let card = &grid.cards[0];
    assert_eq!(card.id, id);
    assert_eq!(card.title, "Piranesi");
    assert_eq!(card.author, "Susanna Clarke");
    assert_eq!(card.genre, "Fantasy");
    assert_eq!(card.status, "Finished");
    assert_eq!(card.month, "February 2025");
    assert_eq!(card.star_glyphs, "★★★½");
    assert_eq!(card.rating_text, "(3.5/5)");
    assert_eq!(card.review.as_deref(), Some("Strange and lovely."));
    assert_eq!(
        card.cover,
        Cover::Image {
            url: "https://covers.example/piranesi.jpg".into()
        }
    );
}

#[test]
fn star_boundaries() {
    let (store, _, shelf) = attached_shelf();
    for (month, rating) in [("2025-03", 3.5), ("2025-02", 3.0), ("2025-01", 3.3)] {
        store
            .insert(BookFields::new(month, "A").with_month(month).with_rating(rating))
            .unwrap();
    }

    let glyphs: Vec<(u8, bool)> = shelf
        .render()
        .unwrap()
        .cards
        .iter()
        .map(|c| (c.stars.full, c.stars.half))
        .collect();
    assert_eq!(glyphs, vec![(3, true), (3, false), (3, false)]);
}

#[test]
fn missing_optional_fields_fall_back() {
    let (store, _, shelf) = attached_shelf();
    let mut fields = BookFields::new("Bare", "Nobody");
    fields.status = ReadingStatus::Unknown;
    store.insert(fields).unwrap();

    let card = shelf.render().unwrap().cards.remove(0);
    assert_eq!(card.genre, bookshelf::NO_GENRE);
    assert_eq!(card.status, "unknown status");
    assert_eq!(card.cover, Cover::Placeholder);
    assert_eq!(card.review, None);
}

#[test]
fn empty_states_explain_themselves() {
    let (store, _, shelf) = attached_shelf();
    assert_eq!(shelf.render().unwrap().empty, Some(EmptyState::NoBooks));

    store
        .insert(BookFields::new("Dune", "Frank Herbert").with_month("2025-01"))
        .unwrap();
    shelf.set_month_filter(MonthFilter::Month("2024-01".into())).unwrap();
    assert_eq!(shelf.render().unwrap().empty, Some(EmptyState::NoFilterMatches));

    shelf.set_month_filter("all").unwrap();
    let grid = shelf.set_query("zzz").unwrap();
    assert_eq!(
        grid.empty_message.as_deref(),
        Some("No books match \"zzz\".")
    );

    shelf.set_status_filter(StatusFilter::Status(ReadingStatus::Reading)).unwrap();
    assert_eq!(
        shelf.render().unwrap().empty,
        Some(EmptyState::NoMatches { query: "zzz".into() })
    );
}

#[test]
fn month_options_follow_the_cache() {
    let (store, _, shelf) = attached_shelf();
    for month in ["2025-01", "2025-03", "2025-01", ""] {
        store
            .insert(BookFields::new("T", "A").with_month(month))
            .unwrap();
    }
    assert_eq!(shelf.month_options().unwrap(), vec!["2025-03", "2025-01"]);
}

#[test]
fn every_snapshot_rerenders_the_grid() {
    let (store, _, shelf) = attached_shelf();
    shelf.set_query("dune").unwrap();
    let seen = record_events(&shelf);

    store.insert(BookFields::new("Dune", "Frank Herbert")).unwrap();
    store.insert(BookFields::new("Emma", "Jane Austen")).unwrap();

    let seen = seen.lock().unwrap();
    let sizes: Vec<usize> = seen
        .iter()
        .filter_map(|event| match event {
            ViewEvent::Rendered(grid) => Some(grid.cards.len()),
            _ => None,
        })
        .collect();
    assert_eq!(sizes, vec![1, 1]);
}
