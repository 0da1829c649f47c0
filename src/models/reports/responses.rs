//! KPI 报表模型
//!
//! KpiCounts 是存储层在一个一致快照内取出的原始计数/合计；
//! KpiReport 的百分比推导是纯函数，分母为零时返回 EmptyCohort。

use serde::Serialize;

use crate::errors::{FacultyEvalError, Result};

// 原始统计量（存储层一次事务内取得）
#[derive(Debug, Clone, Default, Serialize)]
pub struct KpiCounts {
    /// 教学负荷记录总数
    pub total_academic_records: i64,
    /// 有至少一条活动记录的教师数（去重）
    pub active_contributors: i64,
    /// 范围内非管理员用户数，所有百分比的分母
    pub denominator_users: i64,
    /// 大学服务记录总数
    pub university_service_count: i64,
    /// research + conference 标签的科研产出数
    pub conference_research_count: i64,
    /// research + journal 标签的科研产出数
    pub journal_research_count: i64,
    /// 有至少一条会议参与记录的教师数（去重）
    pub conference_participants: i64,
    /// 教学评估打分合计
    pub evaluation_aspects_total: i64,
    /// 大学评估打分合计
    pub university_evaluation_total: i64,
}

// KPI 报表
#[derive(Debug, Clone, Serialize)]
pub struct KpiReport {
    pub department: String,
    pub year: i32,

    #[serde(flatten)]
    pub counts: KpiCounts,

    pub active_contributor_percent: f64,
    pub conference_research_percent: f64,
    pub journal_research_percent: f64,
    pub conference_participant_percent: f64,
    pub evaluation_aspects_average: f64,
    pub university_evaluation_average: f64,
}

impl KpiReport {
    /// 由原始统计量推导百分比
    ///
    /// 分母（范围内非管理员用户数）为零时返回 EmptyCohort，
    /// 而不是让除零在运行时爆掉。
    pub fn from_counts(department: String, year: i32, counts: KpiCounts) -> Result<Self> {
        if counts.denominator_users == 0 {
            return Err(FacultyEvalError::empty_cohort(format!(
                "科室 {department} 在 {year} 年没有可统计的用户"
            )));
        }

        let users = counts.denominator_users as f64;
        let percent = |count: i64| (count as f64 / users) * 100.0;
        let average = |total: i64| total as f64 / users;

        Ok(Self {
            department,
            year,
            active_contributor_percent: percent(counts.active_contributors),
            conference_research_percent: percent(counts.conference_research_count),
            journal_research_percent: percent(counts.journal_research_count),
            conference_participant_percent: percent(counts.conference_participants),
            evaluation_aspects_average: average(counts.evaluation_aspects_total),
            university_evaluation_average: average(counts.university_evaluation_total),
            counts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_cohort_rejected() {
        let counts = KpiCounts::default();
        let err = KpiReport::from_counts("Radiology".into(), 2026, counts).unwrap_err();
        assert_eq!(err.code(), "E010");
    }

    #[test]
    fn test_single_user_department() {
        // 单人科室：一份被打了 40 分的教学评估，平均值应为 40/1
        let counts = KpiCounts {
            denominator_users: 1,
            active_contributors: 1,
            evaluation_aspects_total: 40,
            ..Default::default()
        };
        let report = KpiReport::from_counts("Cardiology".into(), 2026, counts).unwrap();
        assert_eq!(report.evaluation_aspects_average, 40.0);
        assert_eq!(report.active_contributor_percent, 100.0);
        assert_eq!(report.university_evaluation_average, 0.0);
    }

    #[test]
    fn test_percentages() {
        let counts = KpiCounts {
            denominator_users: 8,
            active_contributors: 2,
            conference_research_count: 4,
            journal_research_count: 6,
            conference_participants: 8,
            evaluation_aspects_total: 80,
            university_evaluation_total: 24,
            total_academic_records: 30,
            university_service_count: 5,
        };
        let report = KpiReport::from_counts("All".into(), 2026, counts).unwrap();
        assert_eq!(report.active_contributor_percent, 25.0);
        assert_eq!(report.conference_research_percent, 50.0);
        assert_eq!(report.journal_research_percent, 75.0);
        assert_eq!(report.conference_participant_percent, 100.0);
        assert_eq!(report.evaluation_aspects_average, 10.0);
        assert_eq!(report.university_evaluation_average, 3.0);
        assert_eq!(report.counts.total_academic_records, 30);
    }
}
