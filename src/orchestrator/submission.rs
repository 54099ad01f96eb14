//! 卡片提交 - 编排层
//!
//! 把组装好的卡片一次交给卡片库，只统计成功数量。
//! 单张卡片失败不影响其他卡片；整次请求失败时成功数为 0。

use crate::models::{FlashcardPayload, SubmissionSummary};
use crate::services::NoteSink;
use crate::utils::logging::truncate_text;
use tracing::{debug, error, warn};

/// 提交卡片并汇总结果
pub async fn submit<S: NoteSink>(sink: &S, payloads: &[FlashcardPayload]) -> SubmissionSummary {
    let total = payloads.len();
    if total == 0 {
        return SubmissionSummary::default();
    }

    match sink.add_notes(payloads).await {
        Ok(flags) => {
            if flags.len() != total {
                warn!("⚠️ 返回结果数 {} 与卡片数 {} 不一致", flags.len(), total);
            }
            for (payload, ok) in payloads.iter().zip(&flags) {
                if !ok {
                    debug!("卡片未添加: {}", describe(payload));
                }
            }
            SubmissionSummary {
                total,
                succeeded: flags.iter().take(total).filter(|ok| **ok).count(),
            }
        }
        Err(e) => {
            error!("❌ 提交卡片失败: {}", e);
            SubmissionSummary {
                total,
                succeeded: 0,
            }
        }
    }
}

/// 试运行：只记录卡片内容
pub fn preview(payloads: &[FlashcardPayload]) -> SubmissionSummary {
    for payload in payloads {
        debug!("🔍 试运行卡片: {}", describe(payload));
    }
    SubmissionSummary {
        total: payloads.len(),
        succeeded: 0,
    }
}

fn describe(payload: &FlashcardPayload) -> String {
    let text = serde_json::to_string(payload).unwrap_or_default();
    truncate_text(&text, 160)
}
