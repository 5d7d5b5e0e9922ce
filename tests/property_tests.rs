use proptest::prelude::*;
use rust_decimal::Decimal;
use safari_cart::{CartStore, MemoryStorage, Product, ProductId};
use std::collections::HashSet;

/// Price is a function of the id, so one id never shows up with two prices.
fn product_strategy() -> impl Strategy<Value = Product> {
    (1i64..50).prop_map(|id| {
        Product::new(
            id,
            format!("Product {}", id),
            Decimal::new((id * 2503) % 100_000, 2),
            format!("images/{}.jpg", id),
            "Crafts",
        )
    })
}

fn store() -> CartStore<MemoryStorage> {
    CartStore::new(MemoryStorage::new())
}

proptest! {
    #[test]
    fn prop_line_count_matches_distinct_ids(products in prop::collection::vec(product_strategy(), 0..40)) {
        let mut store = store();
        for product in &products {
            store.add_item(product).unwrap();
        }

        let distinct: HashSet<&ProductId> = products.iter().map(|p| &p.id).collect();
        prop_assert_eq!(store.cart().len(), distinct.len());
        prop_assert_eq!(store.get_item_count(), products.len() as u64);
    }

    #[test]
    fn prop_repeated_adds_accumulate_quantity(product in product_strategy(), times in 1usize..30) {
        let mut store = store();
        for _ in 0..times {
            store.add_item(&product).unwrap();
        }

        prop_assert_eq!(store.cart().len(), 1);
        prop_assert_eq!(store.cart().items()[0].quantity as usize, times);
        prop_assert_eq!(store.get_total(), product.price * Decimal::from(times as u64));
    }

    #[test]
    fn prop_total_independent_of_insertion_order(products in prop::collection::vec(product_strategy(), 0..30)) {
        let mut forward = store();
        for product in &products {
            forward.add_item(product).unwrap();
        }

        let mut backward = store();
        for product in products.iter().rev() {
            backward.add_item(product).unwrap();
        }

        prop_assert_eq!(forward.get_total(), backward.get_total());
        prop_assert_eq!(forward.get_item_count(), backward.get_item_count());
    }

    #[test]
    fn prop_reload_reproduces_cart(products in prop::collection::vec(product_strategy(), 0..30)) {
        let storage = MemoryStorage::new();
        let mut store = CartStore::new(storage.clone());
        for product in &products {
            store.add_item(product).unwrap();
        }

        let reloaded = CartStore::new(storage);
        prop_assert_eq!(reloaded.cart(), store.cart());
    }

    #[test]
    fn prop_non_positive_quantity_removes_line(product in product_strategy(), quantity in -1000i64..=0) {
        let mut store = store();
        store.add_item(&product).unwrap();

        store.update_quantity(&product.id, quantity).unwrap();
        prop_assert!(!store.cart().contains(&product.id));

        store.update_quantity(&product.id, quantity).unwrap();
        prop_assert!(store.cart().is_empty());
        prop_assert_eq!(store.get_total(), Decimal::ZERO);
    }

    #[test]
    fn prop_positive_quantity_is_absolute(product in product_strategy(), quantity in 1i64..10_000) {
        let mut store = store();
        store.add_item(&product).unwrap();
        store.add_item(&product).unwrap();

        store.update_quantity(&product.id, quantity).unwrap();
        prop_assert_eq!(i64::from(store.cart().items()[0].quantity), quantity);
    }
}
