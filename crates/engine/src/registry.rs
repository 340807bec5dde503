//! Payment-channel dictionary of one user.
//!
//! Built-in channels are always valid. A user's `payment_channels` rows add
//! new codes or relabel built-in ones; the registry merges both and answers
//! lookups in either direction.

use std::collections::HashMap;

use crate::normalize::normalize_pay_channel_code;

/// Built-in channel codes and their default labels.
pub const BUILT_IN_PAY_CHANNELS: [(&str, &str); 7] = [
    ("ALIPAY", "支付宝"),
    ("WECHAT", "微信"),
    ("UNIONPAY", "银联"),
    ("CASH", "现金"),
    ("DOUYIN_MONTHLY", "抖音月付"),
    ("MEITUAN_MONTHLY", "美团月付"),
    ("OTHER", "其他"),
];

/// Label used when a channel has no code at all.
pub const FALLBACK_PAY_CHANNEL_LABEL: &str = "其他";
const FALLBACK_PAY_CHANNEL_CODE: &str = "OTHER";

pub fn is_built_in_pay_channel(code: &str) -> bool {
    BUILT_IN_PAY_CHANNELS.iter().any(|(value, _)| *value == code)
}

#[derive(Clone, Debug)]
pub struct PayChannelRegistry {
    code_to_label: HashMap<String, String>,
    label_to_code: HashMap<String, String>,
}

impl Default for PayChannelRegistry {
    fn default() -> Self {
        Self::with_channels(std::iter::empty::<(String, String)>())
    }
}

impl PayChannelRegistry {
    /// Merge the built-in dictionary with a user's `(value, label)` rows.
    /// Rows with a blank value or label are ignored.
    pub fn with_channels<I, V, L>(channels: I) -> Self
    where
        I: IntoIterator<Item = (V, L)>,
        V: AsRef<str>,
        L: AsRef<str>,
    {
        let mut code_to_label = HashMap::new();
        let mut label_to_code = HashMap::new();
        for (code, label) in BUILT_IN_PAY_CHANNELS {
            code_to_label.insert(code.to_string(), label.to_string());
            label_to_code.insert(label.to_string(), code.to_string());
        }

        for (value, label) in channels {
            let value = value.as_ref().trim();
            let label = label.as_ref().trim();
            if value.is_empty() || label.is_empty() {
                continue;
            }
            let code = value.to_uppercase();
            code_to_label.insert(code.clone(), label.to_string());
            label_to_code.insert(label.to_string(), code);
        }

        Self {
            code_to_label,
            label_to_code,
        }
    }

    /// Turn a label or a code into a channel code.
    ///
    /// The result is not validated; check it with [`Self::is_allowed`].
    pub fn resolve(&self, raw: &str) -> Option<String> {
        let trimmed = raw.trim();
        if let Some(code) = self.label_to_code.get(trimmed) {
            return Some(code.clone());
        }
        let code = normalize_pay_channel_code(trimmed)?;
        Some(self.label_to_code.get(&code).cloned().unwrap_or(code))
    }

    pub fn is_allowed(&self, code: &str) -> bool {
        self.code_to_label.contains_key(code)
    }

    /// Display label of a stored channel code.
    pub fn label_for(&self, code: Option<&str>) -> String {
        let raw = code.map(str::trim).unwrap_or_default();
        let key = if raw.is_empty() {
            FALLBACK_PAY_CHANNEL_CODE.to_string()
        } else {
            raw.to_uppercase()
        };
        if let Some(label) = self.code_to_label.get(&key) {
            return label.clone();
        }
        if raw.is_empty() {
            FALLBACK_PAY_CHANNEL_LABEL.to_string()
        } else {
            raw.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> PayChannelRegistry {
        PayChannelRegistry::with_channels([("CMB_CARD", "招行信用卡"), ("ALIPAY", "阿里")])
    }

    #[test]
    fn resolve_prefers_labels() {
        let registry = registry();
        assert_eq!(registry.resolve("招行信用卡"), Some("CMB_CARD".to_string()));
        assert_eq!(registry.resolve("支付宝"), Some("ALIPAY".to_string()));
        assert_eq!(registry.resolve("阿里"), Some("ALIPAY".to_string()));
        assert_eq!(registry.resolve(" wechat "), Some("WECHAT".to_string()));
        assert_eq!(registry.resolve("meituan"), Some("MEITUAN_MONTHLY".to_string()));
        assert_eq!(registry.resolve("unknown"), Some("UNKNOWN".to_string()));
        assert_eq!(registry.resolve("  "), None);
    }

    #[test]
    fn allowed_codes_are_built_ins_and_user_rows() {
        let registry = registry();
        assert!(registry.is_allowed("CASH"));
        assert!(registry.is_allowed("CMB_CARD"));
        assert!(!registry.is_allowed("UNKNOWN"));
        assert!(!PayChannelRegistry::default().is_allowed("CMB_CARD"));
    }

    #[test]
    fn labels_prefer_custom_then_built_in_then_raw() {
        let registry = registry();
        assert_eq!(registry.label_for(Some("ALIPAY")), "阿里");
        assert_eq!(registry.label_for(Some("WECHAT")), "微信");
        assert_eq!(registry.label_for(Some("cmb_card")), "招行信用卡");
        assert_eq!(registry.label_for(Some("LEGACY_CODE")), "LEGACY_CODE");
        assert_eq!(registry.label_for(None), "其他");
        assert_eq!(registry.label_for(Some(" ")), "其他");
    }

    #[test]
    fn relabeled_other_is_used_for_missing_codes() {
        let registry = PayChannelRegistry::with_channels([("OTHER", "杂项")]);
        assert_eq!(registry.label_for(None), "杂项");
    }
}
