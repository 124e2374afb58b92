//! # vocab-algo - 词汇复习调度核心库
//!
//! 本 crate 提供纯 Rust 实现的掌握度调度逻辑:
//!
//! - **Mastery Scheduler** - 0–5 级掌握度状态机与间隔重复复习时间
//! - **Due Selection** - 按最早到期排序的待复习单词查询
//! - **Urgency Ranking** - 仅用于展示的紧迫度排序
//!
//! ## 设计理念
//!
//! - **纯函数** - 调度器不持有状态，不做 I/O；时钟通过 `now` 参数传入
//! - **防御性截断** - 损坏的持久化数据被截断到合法范围，而不是中断学习
//! - **单一权威间隔表** - 分钟/小时/天间隔表决定 `next_review`；天级表只用于估算
//!
//! ## 模块结构
//!
//! - [`scheduler`] - 答题后的状态转移、到期判断、到期单词选择
//! - [`intervals`] - 权威复习间隔表与天级估算表
//! - [`urgency`] - 紧迫度评分 (展示用)
//! - [`stats`] - 掌握度汇总统计
//! - [`sanitize`] - 持久化记录的修复与诊断
//! - [`types`] - 公共类型和常量
//!
//! ## 使用示例
//!
//! ```rust
//! use chrono::{Duration, Utc};
//! use vocab_algo::{record_attempt, select_due_words, DEFAULT_DUE_LIMIT};
//!
//! let now = Utc::now();
//! let record = record_attempt(None, "apple", true, now);
//! assert_eq!(record.mastery_level.get(), 1);
//! assert_eq!(record.next_review, now + Duration::minutes(10));
//!
//! let records = vec![record];
//! let due: Vec<_> = select_due_words(&records, now + Duration::hours(1), DEFAULT_DUE_LIMIT).collect();
//! assert_eq!(due.len(), 1);
//! ```

// ============================================================================
// 模块声明
// ============================================================================

pub mod intervals;
pub mod sanitize;
pub mod scheduler;
pub mod stats;
pub mod types;
pub mod urgency;

// ============================================================================
// 重新导出
// ============================================================================

/// 重新导出所有公共类型
pub use types::*;

/// 重新导出调度器
pub use scheduler::{is_due, is_due_opt, record_attempt, select_due_words, DueWords};

/// 重新导出间隔表
pub use intervals::{estimate_interval_days, format_interval, review_delay};

/// 重新导出紧迫度排序
pub use urgency::{estimated_next_interval_days, rank_by_urgency, urgency};

/// 重新导出统计与数据清洗
pub use sanitize::{diagnose_record, sanitize_record, SanitizeError};
pub use stats::summarize;
