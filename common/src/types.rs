use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// 交易确认级别
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ConfirmationStatus {
    Processed,
    Confirmed,
    Finalized,
}

/// 交易签名描述（getSignaturesForAddress 返回的单条记录）
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SignatureInfo {
    pub signature: String,
    #[serde(default)]
    pub slot: Option<u64>,
    /// 交易失败时的错误对象，成功时为空
    #[serde(default)]
    pub err: Option<serde_json::Value>,
    #[serde(default)]
    pub memo: Option<String>,
    /// 出块时间（Unix秒），未知时为空
    #[serde(default)]
    pub block_time: Option<i64>,
    #[serde(default)]
    pub confirmation_status: Option<ConfirmationStatus>,
}

impl SignatureInfo {
    pub fn new(signature: impl Into<String>, block_time: Option<i64>) -> Self {
        Self {
            signature: signature.into(),
            slot: None,
            err: None,
            memo: None,
            block_time,
            confirmation_status: None,
        }
    }

    pub fn is_failed(&self) -> bool {
        self.err.is_some()
    }
}

/// 历史流中的一条记录
///
/// 合并后的流不再暴露记录来自哪个数据源，因此每条记录都带上所属账户和代币符号。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StreamItem {
    pub signature_info: SignatureInfo,
    pub account: String,
    pub symbol: String,
}

impl StreamItem {
    pub fn new(signature_info: SignatureInfo, account: impl Into<String>, symbol: impl Into<String>) -> Self {
        Self {
            signature_info,
            account: account.into(),
            symbol: symbol.into(),
        }
    }

    pub fn signature(&self) -> &str {
        &self.signature_info.signature
    }

    pub fn block_time(&self) -> Option<i64> {
        self.signature_info.block_time
    }
}

/// 拉取配置
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchingConfiguration {
    /// 关注区间的下界（不包含）。数据源遇到不晚于该时间的记录即停止产出。
    pub timestamp_end: DateTime<Utc>,
}

impl FetchingConfiguration {
    pub fn new(timestamp_end: DateTime<Utc>) -> Self {
        Self { timestamp_end }
    }

    /// 以某条记录的出块时间为锚点，向前回溯 `window` 作为下界
    ///
    /// 锚点或下界超出可表示的时间范围时返回 `None`。
    pub fn window_before(block_time: i64, window: Duration) -> Option<Self> {
        let anchor = DateTime::<Utc>::from_timestamp(block_time, 0)?;
        anchor.checked_sub_signed(window).map(Self::new)
    }

    /// 记录是否落在关注区间内。无出块时间的记录无法判定，视为在区间内。
    pub fn accepts(&self, block_time: Option<i64>) -> bool {
        match block_time {
            Some(secs) => secs > self.timestamp_end.timestamp(),
            None => true,
        }
    }
}

/// 账户与代币符号
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccountSymbol {
    pub account: String,
    pub symbol: String,
}

impl AccountSymbol {
    pub fn new(account: impl Into<String>, symbol: impl Into<String>) -> Self {
        Self {
            account: account.into(),
            symbol: symbol.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signature_info_deserialize() {
        let json = r#"{
            "signature": "5h6xBEauJ3PK6SWCZ1PGjBvj8vDdWG3KpwATGy1ARAXFSDwt8GFXM7W5Ncn16wmqokgpiKRLuS83KUxyZyv2sUYv",
            "slot": 114,
            "err": null,
            "memo": null,
            "blockTime": 1700000000,
            "confirmationStatus": "finalized"
        }"#;

        let info: SignatureInfo = serde_json::from_str(json).unwrap();
        assert_eq!(info.slot, Some(114));
        assert_eq!(info.block_time, Some(1_700_000_000));
        assert_eq!(info.confirmation_status, Some(ConfirmationStatus::Finalized));
        assert!(!info.is_failed());
    }

    #[test]
    fn test_signature_info_missing_fields() {
        let info: SignatureInfo = serde_json::from_str(r#"{"signature":"abc"}"#).unwrap();
        assert_eq!(info.signature, "abc");
        assert_eq!(info.block_time, None);
        assert_eq!(info.confirmation_status, None);
    }

    #[test]
    fn test_stream_item_accessors() {
        let item = StreamItem::new(SignatureInfo::new("sig1", Some(100)), "acc1", "SOL");
        assert_eq!(item.signature(), "sig1");
        assert_eq!(item.block_time(), Some(100));
        assert_eq!(item.account, "acc1");
        assert_eq!(item.symbol, "SOL");
    }

    #[test]
    fn test_fetching_configuration_is_exclusive() {
        let config = FetchingConfiguration::new(DateTime::<Utc>::from_timestamp(100, 0).unwrap());
        assert!(config.accepts(Some(101)));
        assert!(!config.accepts(Some(100)));
        assert!(!config.accepts(Some(99)));
        assert!(config.accepts(None));
    }

    #[test]
    fn test_window_before() {
        let config = FetchingConfiguration::window_before(1_700_086_400, Duration::days(1)).unwrap();
        assert_eq!(config.timestamp_end.timestamp(), 1_700_000_000);
    }

    #[test]
    fn test_window_before_out_of_range() {
        let near_min = DateTime::<Utc>::MIN_UTC.timestamp() + 60;
        assert!(FetchingConfiguration::window_before(near_min, Duration::hours(24)).is_none());
        assert!(FetchingConfiguration::window_before(near_min, Duration::seconds(30)).is_some());
        assert!(FetchingConfiguration::window_before(i64::MAX, Duration::hours(24)).is_none());
    }
}
