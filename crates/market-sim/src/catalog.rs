//! Selectable assets shown on the trading screen.

use serde::{Deserialize, Serialize};

/// One asset tile of the selector strip
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetTile {
    pub id: String,
    pub name: String,
    pub display_name: String,
    /// Quoted price label, as shown
    pub price: String,
    /// Percent change label with its sign, e.g. "+1.2"
    pub change: String,
    pub color: String,
    pub icon: String,
    /// Chart symbol when it differs from the id
    pub symbol: Option<String>,
}

impl AssetTile {
    #[allow(clippy::too_many_arguments)]
    fn new(
        id: &str,
        name: &str,
        display_name: &str,
        price: &str,
        change: &str,
        color: &str,
        icon: &str,
        symbol: Option<&str>,
    ) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            display_name: display_name.to_string(),
            price: price.to_string(),
            change: change.to_string(),
            color: color.to_string(),
            icon: icon.to_string(),
            symbol: symbol.map(str::to_string),
        }
    }

    /// Price label with `.00` appended when it has no decimals
    pub fn display_price(&self) -> String {
        if self.price.contains('.') {
            self.price.clone()
        } else {
            format!("{}.00", self.price)
        }
    }

    pub fn is_positive(&self) -> bool {
        self.change.starts_with('+')
    }

    pub fn chart_symbol(&self) -> &str {
        self.symbol.as_deref().unwrap_or(&self.id)
    }
}

/// Built-in asset selector entries
pub struct AssetCatalog;

impl AssetCatalog {
    pub fn all() -> Vec<AssetTile> {
        vec![
            AssetTile::new("GOLD", "Gold", "Gold", "2024.50", "+1.2", "#FFD700", "🪙", Some("XAU/USD")),
            AssetTile::new("BTC/USD", "Bitcoin", "BTC/USD", "52,145", "+0.8", "#F7931A", "₿", None),
            AssetTile::new("AAPL", "Apple", "Apple", "180.25", "+2.1", "#000000", "🍎", None),
            AssetTile::new("OIL", "Oil", "Oil", "78.35", "-0.5", "#4A4A4A", "🛢️", Some("CL/USD")),
            AssetTile::new("EUR/USD", "EUR/USD", "EUR/USD", "1.0845", "-0.3", "#0052B4", "€", None),
            AssetTile::new("NATGAS", "Natural Gas", "Natural Gas", "1.642", "+1.5", "#60A5FA", "🔥", Some("NG/USD")),
        ]
    }

    pub fn get(id: &str) -> Option<AssetTile> {
        Self::all().into_iter().find(|a| a.id == id)
    }

    /// Instrument key the chart should use for an asset id.
    /// Unknown ids pass through unchanged.
    pub fn chart_symbol(id: &str) -> String {
        Self::get(id)
            .map(|a| a.chart_symbol().to_string())
            .unwrap_or_else(|| id.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chart_symbol_aliases() {
        assert_eq!(AssetCatalog::chart_symbol("GOLD"), "XAU/USD");
        assert_eq!(AssetCatalog::chart_symbol("OIL"), "CL/USD");
        assert_eq!(AssetCatalog::chart_symbol("NATGAS"), "NG/USD");
        assert_eq!(AssetCatalog::chart_symbol("BTC/USD"), "BTC/USD");
        assert_eq!(AssetCatalog::chart_symbol("DOGE"), "DOGE");
    }

    #[test]
    fn test_display_price() {
        let btc = AssetCatalog::get("BTC/USD").unwrap();
        assert_eq!(btc.display_price(), "52,145.00");
        let aapl = AssetCatalog::get("AAPL").unwrap();
        assert_eq!(aapl.display_price(), "180.25");
    }

    #[test]
    fn test_change_direction() {
        assert!(AssetCatalog::get("GOLD").unwrap().is_positive());
        assert!(!AssetCatalog::get("OIL").unwrap().is_positive());
    }
}
