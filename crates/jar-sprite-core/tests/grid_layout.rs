use jar_sprite_core::error::SpriteError;
use jar_sprite_core::prelude::*;
use jar_sprite_core::{grid_position, rows_needed, sheet_dimensions};

fn keys(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("icon_{}", i)).collect()
}

#[test]
fn positions_follow_index_div_and_mod() {
    let spec = GridSpec::default();
    for n in [0usize, 1, 9, 10, 11, 23] {
        let layout = compute_layout(keys(n), &spec).expect("layout");
        assert_eq!(layout.len(), n);
        for (i, e) in layout.entries.iter().enumerate() {
            assert_eq!(e.index, i);
            assert_eq!(e.position.row, (i / 10) as u32, "row for n={} i={}", n, i);
            assert_eq!(e.position.column, (i % 10) as u32, "column for n={} i={}", n, i);
            assert_eq!(e.offset_x, e.position.column * 32);
            assert_eq!(e.offset_y, e.position.row * 32);
            assert_eq!(e.offset_x % spec.tile_width, 0);
            assert_eq!(e.offset_y % spec.tile_height, 0);
        }
    }
}

#[test]
fn no_tile_is_clipped() {
    let spec = GridSpec::default();
    for n in [1usize, 9, 10, 11, 19, 20, 21, 23, 100] {
        let layout = compute_layout(keys(n), &spec).expect("layout");
        assert_eq!(layout.width, spec.max_columns * spec.tile_width);
        for e in &layout.entries {
            assert!(e.offset_x + spec.tile_width <= layout.width, "n={} x clipped", n);
            assert!(e.offset_y + spec.tile_height <= layout.height, "n={} y clipped", n);
        }
    }
}

#[test]
fn exact_multiple_of_columns_does_not_add_a_row() {
    let spec = GridSpec::default();
    let ten = compute_layout(keys(10), &spec).expect("layout");
    assert_eq!(ten.rows, 1);
    assert_eq!(ten.height, 32);

    let twenty = compute_layout(keys(20), &spec).expect("layout");
    assert_eq!(twenty.rows, 2);
    assert_eq!(twenty.height, 64);
    let last = twenty.entries.last().expect("last");
    assert_eq!(last.offset_y + 32, twenty.height);

    let eleven = compute_layout(keys(11), &spec).expect("layout");
    assert_eq!(eleven.rows, 2);
}

#[test]
fn twenty_three_tiles_fill_rows_ten_ten_three() {
    let layout = compute_layout(keys(23), &GridSpec::default()).expect("layout");
    assert_eq!(layout.rows, 3);
    assert_eq!(layout.row_lengths(), vec![10, 10, 3]);
    assert_eq!((layout.width, layout.height), (320, 96));
}

#[test]
fn empty_layout_keeps_one_transparent_row() {
    let layout = compute_layout(Vec::<String>::new(), &GridSpec::default()).expect("layout");
    assert!(layout.is_empty());
    assert_eq!(layout.rows, 1);
    assert_eq!((layout.width, layout.height), (320, 32));
    assert_eq!(rows_needed(0, 10), 1);
}

#[test]
fn custom_grid_spec() {
    let spec = GridSpec {
        max_columns: 3,
        tile_width: 16,
        tile_height: 24,
    };
    let layout = compute_layout(keys(7), &spec).expect("layout");
    assert_eq!((layout.width, layout.height), (48, 72));
    let e = &layout.entries[5];
    assert_eq!(e.position, GridPosition { row: 1, column: 2 });
    assert_eq!((e.offset_x, e.offset_y), (32, 24));
    assert_eq!(grid_position(6, 3), GridPosition { row: 2, column: 0 });
}

#[test]
fn zero_dimensions_are_rejected() {
    let spec = GridSpec {
        max_columns: 0,
        tile_width: 32,
        tile_height: 32,
    };
    match compute_layout(keys(3), &spec) {
        Err(SpriteError::InvalidConfig(_)) => {}
        other => panic!("expected InvalidConfig, got {:?}", other.map(|l| l.len())),
    }
}

#[test]
fn oversized_sheet_reports_error() {
    let spec = GridSpec {
        max_columns: 1,
        tile_width: 1,
        tile_height: u32::MAX / 2,
    };
    match sheet_dimensions(3, &spec) {
        Err(SpriteError::SheetTooLarge { tiles, .. }) => assert_eq!(tiles, 3),
        other => panic!("expected SheetTooLarge, got {:?}", other),
    }
}
