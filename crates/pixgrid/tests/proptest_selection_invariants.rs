//! Property-based invariant tests for click selection.
//!
//! 1. Selection matches a toggle model over purchasable in-grid cells
//! 2. Owned and out-of-grid coordinates are never selected
//! 3. `bounds()` covers every selected coordinate and is tight
//! 4. `prune_owned` leaves exactly the selected cells that are still free

use std::collections::BTreeSet;

use pixgrid::{Cell, CellCoord, GridGeometry, Selection, SelectionChange, SpatialIndex};
use proptest::prelude::*;

const GRID: GridGeometry = GridGeometry::new(16, 12, 10.0);

fn coord_strategy() -> impl Strategy<Value = CellCoord> {
    (-2i32..18, -2i32..14).prop_map(|(x, y)| CellCoord::new(x, y))
}

fn owned_strategy() -> impl Strategy<Value = Vec<CellCoord>> {
    prop::collection::vec((0i32..16, 0i32..12).prop_map(|(x, y)| CellCoord::new(x, y)), 0..30)
}

fn index_of(owned: &[CellCoord]) -> SpatialIndex {
    let mut index = SpatialIndex::with_chunk_size(4);
    index.extend(
        owned
            .iter()
            .map(|c| Cell::new(format!("{}:{}", c.x, c.y), c.x, c.y).with_owner("u")),
    );
    index
}

proptest! {
    #[test]
    fn selection_matches_toggle_model(
        owned in owned_strategy(),
        clicks in prop::collection::vec(coord_strategy(), 0..120),
    ) {
        let index = index_of(&owned);
        let mut selection = Selection::new();
        let mut model = BTreeSet::new();

        for coord in clicks {
            let change = selection.click(coord, &GRID, &index);
            if !GRID.contains(coord) {
                prop_assert_eq!(change, SelectionChange::OutOfBounds(coord));
            } else if index.has(coord.x, coord.y) {
                let is_owned_click = matches!(change, SelectionChange::OwnedCellClicked { .. });
                prop_assert!(is_owned_click);
            } else if model.remove(&coord) {
                prop_assert_eq!(change, SelectionChange::Deselected(coord));
            } else {
                model.insert(coord);
                prop_assert_eq!(change, SelectionChange::Selected(coord));
            }
        }

        prop_assert_eq!(selection.len(), model.len());
        for coord in selection.iter() {
            prop_assert!(model.contains(&coord));
            prop_assert!(GRID.contains(coord));
            prop_assert!(!index.has(coord.x, coord.y));
        }
    }

    #[test]
    fn bounds_are_tight(
        clicks in prop::collection::vec((0i32..16, 0i32..12), 1..40),
    ) {
        let index = SpatialIndex::new();
        let mut selection = Selection::new();
        for (x, y) in clicks {
            selection.click(CellCoord::new(x, y), &GRID, &index);
        }
        let bounds = selection.bounds();
        prop_assert_eq!(bounds.is_empty(), selection.is_empty());
        if selection.is_empty() {
            return Ok(());
        }

        for coord in selection.iter() {
            prop_assert!(bounds.contains(coord));
        }
        let xs: Vec<_> = selection.iter().map(|c| c.x).collect();
        let ys: Vec<_> = selection.iter().map(|c| c.y).collect();
        prop_assert_eq!(bounds.x, *xs.iter().min().unwrap());
        prop_assert_eq!(bounds.y, *ys.iter().min().unwrap());
        prop_assert_eq!(bounds.right(), xs.iter().max().unwrap() + 1);
        prop_assert_eq!(bounds.bottom(), ys.iter().max().unwrap() + 1);
    }

    #[test]
    fn prune_keeps_exactly_free_cells(
        clicks in prop::collection::vec((0i32..16, 0i32..12), 0..40),
        bought in owned_strategy(),
    ) {
        let mut selection = Selection::new();
        let empty = SpatialIndex::new();
        for (x, y) in clicks {
            selection.click(CellCoord::new(x, y), &GRID, &empty);
        }
        let before: BTreeSet<_> = selection.iter().collect();

        let index = index_of(&bought);
        let dropped = selection.prune_owned(&index);
        let after: BTreeSet<_> = selection.iter().collect();

        let expected: BTreeSet<_> = before
            .iter()
            .copied()
            .filter(|c| !index.has(c.x, c.y))
            .collect();
        prop_assert_eq!(&after, &expected);
        prop_assert_eq!(dropped, before.len() - after.len());
    }
}
