use std::collections::HashMap;

pub struct Stock {
    counts: HashMap<String, u32>,
}

impl Stock {
    pub fn new() -> Self {
        Self {
            counts: HashMap::new(),
        }
    }

    pub fn take(&mut self, sku: &str, amount: u32) -> bool {
        match self.counts.get_mut(sku) {
            Some(count) if *count >= amount => {
                *count -= amount;
                true
            }
            _ => false,
        }
    }
}

pub fn restock(stock: &mut Stock, sku: &str, amount: u32) {
    *stock.counts.entry(sku.to_string()).or_insert(0) += amount;
}
