use crate::domain::model::{Cart, CartEvent, CartLineItem, Product, ProductId};
use crate::domain::ports::{CartObserver, Storage};
use crate::utils::error::Result;
use crate::utils::validation::parse_quantity;
use rust_decimal::Decimal;

pub const DEFAULT_CART_KEY: &str = "shoppingCart";

/// Owns the cart and keeps storage in step with it.
///
/// Each mutator stages the change on a copy, writes the whole cart to storage,
/// and only then swaps it in. A failed write leaves the in-memory cart as it
/// was. Observers hear about a change after it is durable, and only when
/// something actually changed.
pub struct CartStore<S: Storage> {
    storage: S,
    key: String,
    cart: Cart,
    observers: Vec<Box<dyn CartObserver>>,
}

impl<S: Storage> CartStore<S> {
    /// Hydrates from storage under the default `shoppingCart` key.
    pub fn new(storage: S) -> Self {
        Self::with_key(storage, DEFAULT_CART_KEY)
    }

    pub fn with_key(storage: S, key: impl Into<String>) -> Self {
        let mut store = Self {
            storage,
            key: key.into(),
            cart: Cart::new(),
            observers: Vec::new(),
        };
        store.load();
        store
    }

    pub fn subscribe(&mut self, observer: impl CartObserver + 'static) {
        self.observers.push(Box::new(observer));
    }

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Re-reads persisted state. Missing or unreadable data means an empty cart.
    pub fn load(&mut self) -> &Cart {
        self.cart = match self.storage.read(&self.key) {
            Ok(Some(raw)) => match serde_json::from_str::<Cart>(&raw) {
                Ok(cart) => sanitize(cart),
                Err(e) => salvage(&self.key, &raw, e),
            },
            Ok(None) => Cart::new(),
            Err(e) => {
                tracing::warn!("Could not read cart under '{}': {}", self.key, e);
                Cart::new()
            }
        };
        tracing::debug!(
            "Loaded cart with {} lines ({} items)",
            self.cart.len(),
            self.cart.item_count()
        );
        &self.cart
    }

    pub fn add_item(&mut self, product: &Product) -> Result<&Cart> {
        let mut next = self.cart.clone();
        next.add_product(product);
        let quantity = next.get(&product.id).map(|item| item.quantity).unwrap_or(1);

        tracing::debug!("Adding product {} (now x{})", product.id, quantity);
        self.commit(
            next,
            Some(CartEvent::ItemAdded {
                product: product.clone(),
                quantity,
            }),
        )
    }

    pub fn remove_item(&mut self, id: &ProductId) -> Result<&Cart> {
        let mut next = self.cart.clone();
        let event = next
            .remove(id)
            .then(|| CartEvent::ItemRemoved { id: id.clone() });

        tracing::debug!("Removing product {} (present: {})", id, event.is_some());
        self.commit(next, event)
    }

    /// Absolute set; `quantity <= 0` removes the line, unknown ids are ignored.
    pub fn update_quantity(&mut self, id: &ProductId, quantity: i64) -> Result<&Cart> {
        if quantity <= 0 {
            return self.remove_item(id);
        }

        let mut next = self.cart.clone();
        let event = if next.set_quantity(id, quantity) {
            next.get(id).map(|item| CartEvent::QuantityUpdated {
                id: id.clone(),
                quantity: item.quantity,
            })
        } else {
            None
        };

        tracing::debug!("Setting quantity of {} to {}", id, quantity);
        self.commit(next, event)
    }

    /// For raw text from a quantity input box. Non-integers count as zero.
    pub fn update_quantity_from_input(&mut self, id: &ProductId, input: &str) -> Result<&Cart> {
        let quantity = parse_quantity(input);
        if quantity <= 0 {
            tracing::debug!("Quantity input {:?} for {} treated as removal", input, id);
        }
        self.update_quantity(id, quantity)
    }

    pub fn clear(&mut self) -> Result<&Cart> {
        let mut next = self.cart.clone();
        let event = next.clear().then_some(CartEvent::Cleared);

        tracing::debug!("Clearing cart");
        self.commit(next, event)
    }

    pub fn get_total(&self) -> Decimal {
        self.cart.total()
    }

    pub fn get_item_count(&self) -> u64 {
        self.cart.item_count()
    }

    fn commit(&mut self, next: Cart, event: Option<CartEvent>) -> Result<&Cart> {
        let serialized = serde_json::to_string(&next)?;
        self.storage.write(&self.key, &serialized)?;
        self.cart = next;

        if let Some(event) = event {
            for observer in &self.observers {
                observer.on_cart_changed(&event, &self.cart);
            }
        }
        Ok(&self.cart)
    }
}

/// Keeps the lines that still decode when the array as a whole does not,
/// e.g. one entry with a negative or fractional quantity.
fn salvage(key: &str, raw: &str, error: serde_json::Error) -> Cart {
    let lines = match serde_json::from_str::<Vec<serde_json::Value>>(raw) {
        Ok(lines) => lines,
        Err(_) => {
            tracing::warn!("Discarding unreadable cart under '{}': {}", key, error);
            return Cart::new();
        }
    };

    let total = lines.len();
    let readable: Vec<serde_json::Value> = lines
        .into_iter()
        .filter(|line| serde_json::from_value::<CartLineItem>(line.clone()).is_ok())
        .collect();
    tracing::warn!(
        "Dropped {} unreadable line(s) from cart under '{}': {}",
        total - readable.len(),
        key,
        error
    );

    match serde_json::from_value::<Cart>(serde_json::Value::Array(readable)) {
        Ok(cart) => sanitize(cart),
        Err(_) => Cart::new(),
    }
}

/// Hand-edited storage could hold zero quantities or repeated ids.
/// Zero-quantity lines are dropped and repeats are folded into the first line.
fn sanitize(cart: Cart) -> Cart {
    let mut clean = Cart::new();
    for item in cart.items() {
        if item.quantity == 0 {
            continue;
        }
        match clean.get(&item.id).map(|existing| existing.quantity) {
            Some(existing) => {
                let merged = i64::from(existing) + i64::from(item.quantity);
                clean.set_quantity(&item.id, merged);
            }
            None => {
                let product = Product {
                    id: item.id.clone(),
                    name: item.name.clone(),
                    price: item.price,
                    image: item.image.clone(),
                    category: item.category.clone(),
                };
                clean.add_product(&product);
                clean.set_quantity(&item.id, i64::from(item.quantity));
            }
        }
    }
    clean
}
