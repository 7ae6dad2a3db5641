// 交易历史合并流
//
// 把多个独立分页的交易历史数据源（每个账户一个）合并成一条按时间倒序的分页流。

pub mod config;
pub mod pager;
pub mod repository;
pub mod streaming;

pub use config::AppConfig;
pub use pager::{HistoryPage, HistoryPager, PageOutcome, PagerConfig};
pub use repository::{InMemorySignatureRepository, RpcConfig, RpcSignatureRepository, SignatureRepository};
pub use streaming::{
    AccountStreamSource, EmptyStreamSource, MultipleStreamSource, StreamError, StreamSource,
};
