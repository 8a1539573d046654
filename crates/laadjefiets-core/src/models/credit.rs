use serde::{Deserialize, Serialize};

use super::de;

/// Preset top-up amounts offered by the console, in euros.
pub const TOP_UP_AMOUNTS: [u32; 4] = [5, 10, 20, 50];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreditBalance {
    #[serde(default, deserialize_with = "de::f64_lenient")]
    pub balance: f64,
}

impl CreditBalance {
    pub fn display(&self) -> String {
        format!("€ {:.2}", self.balance)
    }

    /// Balance after adding `amount`, for the confirmation preview.
    pub fn preview_after(&self, amount: u32) -> String {
        format!("€ {:.2}", self.balance + f64::from(amount))
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TopUp {
    pub amount: u32,
}
