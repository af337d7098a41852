// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Nexus AI Contributors

//! Built-in data-fetch tools
//!
//! Each adapter wraps one public market-data API. All of them accept a
//! custom base URL so tests can point them at a mock server.

use std::sync::Arc;

use crate::tools::Tool;

pub mod crypto_news;
pub mod defi_tvl;
pub mod fear_greed;
pub mod gas_tracker;
pub mod live_search;
pub mod market_price;
pub mod onchain_data;
pub mod whale_tracker;

pub use crypto_news::CryptoNewsTool;
pub use defi_tvl::DefiTvlTool;
pub use fear_greed::FearGreedTool;
pub use gas_tracker::GasTrackerTool;
pub use live_search::LiveSearchTool;
pub use market_price::MarketPriceTool;
pub use onchain_data::OnchainDataTool;
pub use whale_tracker::WhaleTrackerTool;

/// All built-in tools, in registration order
pub fn all() -> Vec<Arc<dyn Tool>> {
    vec![
        Arc::new(MarketPriceTool::new()),
        Arc::new(FearGreedTool::new()),
        Arc::new(CryptoNewsTool::new()),
        Arc::new(LiveSearchTool::new()),
        Arc::new(DefiTvlTool::new()),
        Arc::new(GasTrackerTool::new()),
        Arc::new(WhaleTrackerTool::new()),
        Arc::new(OnchainDataTool::new()),
    ]
}
