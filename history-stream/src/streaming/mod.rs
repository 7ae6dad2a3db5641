// 交易历史合并流 - Streaming模块
//
// 本模块实现了多数据源交易历史的统一流式拉取。
//
// # 核心组件
//
// - `StreamSource`: 统一的数据源抽象接口
// - `EmptyStreamSource`: 空数据源
// - `AccountStreamSource`: 单账户签名历史数据源
// - `MultipleStreamSource`: 多数据源按时间合并
//
// # 设计目标
//
// 1. **全局有序**: 每批合并结果按出块时间倒序
// 2. **不重复拉取**: 已消费的记录不会再次请求
// 3. **并发拉取**: 各数据源并发请求，同一数据源不并发
// 4. **全有或全无**: 任一数据源失败，整批作废

pub mod account_source;
pub mod error;
pub mod multiple_source;
pub mod source;

// 重新导出核心类型
pub use account_source::{AccountStreamSource, DEFAULT_BATCH_SIZE};
pub use error::StreamError;
pub use multiple_source::MultipleStreamSource;
pub use source::{EmptyStreamSource, StreamSource};
