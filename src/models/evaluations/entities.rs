use serde::{Deserialize, Serialize};

// 评估类别
//
// 多条目类别每人每年可提交多条；单表单类别每人每年至多一份自评，
// 并可叠加一次系主任/管理员打分。
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum EvaluationCategory {
    // 多条目
    AcademicLoad,
    ActivityLog,
    ParticipationConference,
    UniversityService,
    ScientificResearch,
    // 单表单
    ScientificProduction,
    EthicsResponsibility,
    EvaluationAspects,
    UniversityEvaluation,
}

/// 类别的存储形态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryKind {
    /// 多条记录，按 id 索引
    MultiEntry,
    /// 每人每年一份表单，按 (user_id, category, year) 唯一
    SingleForm,
}

impl EvaluationCategory {
    pub const ALL: &'static [EvaluationCategory] = &[
        EvaluationCategory::AcademicLoad,
        EvaluationCategory::ActivityLog,
        EvaluationCategory::ParticipationConference,
        EvaluationCategory::UniversityService,
        EvaluationCategory::ScientificResearch,
        EvaluationCategory::ScientificProduction,
        EvaluationCategory::EthicsResponsibility,
        EvaluationCategory::EvaluationAspects,
        EvaluationCategory::UniversityEvaluation,
    ];

    pub fn kind(&self) -> CategoryKind {
        match self {
            EvaluationCategory::AcademicLoad
            | EvaluationCategory::ActivityLog
            | EvaluationCategory::ParticipationConference
            | EvaluationCategory::UniversityService
            | EvaluationCategory::ScientificResearch => CategoryKind::MultiEntry,
            EvaluationCategory::ScientificProduction
            | EvaluationCategory::EthicsResponsibility
            | EvaluationCategory::EvaluationAspects
            | EvaluationCategory::UniversityEvaluation => CategoryKind::SingleForm,
        }
    }

    /// 是否存在打分叠加层。教学负荷与活动记录只参与 KPI 计数，没有打分。
    pub fn is_scoreable(&self) -> bool {
        self.kind() == CategoryKind::SingleForm
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EvaluationCategory::AcademicLoad => "academic_load",
            EvaluationCategory::ActivityLog => "activity_log",
            EvaluationCategory::ParticipationConference => "participation_conference",
            EvaluationCategory::UniversityService => "university_service",
            EvaluationCategory::ScientificResearch => "scientific_research",
            EvaluationCategory::ScientificProduction => "scientific_production",
            EvaluationCategory::EthicsResponsibility => "ethics_responsibility",
            EvaluationCategory::EvaluationAspects => "evaluation_aspects",
            EvaluationCategory::UniversityEvaluation => "university_evaluation",
        }
    }
}

impl<'de> Deserialize<'de> for EvaluationCategory {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse::<EvaluationCategory>().map_err(|_| {
            serde::de::Error::custom(format!(
                "无效的评估类别: '{s}'. 支持的类别: academic_load, activity_log, participation_conference, university_service, scientific_research, scientific_production, ethics_responsibility, evaluation_aspects, university_evaluation"
            ))
        })
    }
}

impl std::fmt::Display for EvaluationCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for EvaluationCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "academic_load" => Ok(EvaluationCategory::AcademicLoad),
            "activity_log" => Ok(EvaluationCategory::ActivityLog),
            "participation_conference" => Ok(EvaluationCategory::ParticipationConference),
            "university_service" => Ok(EvaluationCategory::UniversityService),
            "scientific_research" => Ok(EvaluationCategory::ScientificResearch),
            "scientific_production" => Ok(EvaluationCategory::ScientificProduction),
            "ethics_responsibility" => Ok(EvaluationCategory::EthicsResponsibility),
            "evaluation_aspects" => Ok(EvaluationCategory::EvaluationAspects),
            "university_evaluation" => Ok(EvaluationCategory::UniversityEvaluation),
            _ => Err(format!("Invalid evaluation category: {s}")),
        }
    }
}

// 科研产出类型（受控词汇，KPI 精确匹配用）
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ResearchType {
    Research,
    Review,
}

impl ResearchType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResearchType::Research => "research",
            ResearchType::Review => "review",
        }
    }
}

impl std::fmt::Display for ResearchType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ResearchType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "research" => Ok(ResearchType::Research),
            "review" => Ok(ResearchType::Review),
            _ => Err(format!("Invalid research type: {s}")),
        }
    }
}

// 发表渠道类型（受控词汇）
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PublisherKind {
    Conference,
    Journal,
    Other,
}

impl PublisherKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PublisherKind::Conference => "conference",
            PublisherKind::Journal => "journal",
            PublisherKind::Other => "other",
        }
    }
}

impl std::fmt::Display for PublisherKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for PublisherKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "conference" => Ok(PublisherKind::Conference),
            "journal" => Ok(PublisherKind::Journal),
            "other" => Ok(PublisherKind::Other),
            _ => Err(format!("Invalid publisher kind: {s}")),
        }
    }
}

// 多条目评估记录
#[derive(Debug, Clone, Serialize)]
pub struct EvaluationEntry {
    pub id: i64,
    pub user_id: i64,
    pub category: EvaluationCategory,
    pub year: i32,
    pub payload: serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub research_type: Option<ResearchType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publisher_kind: Option<PublisherKind>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

// 单表单打分叠加层（系主任/管理员录入，与自评生命周期独立）
#[derive(Debug, Clone, Serialize)]
pub struct ScoringOverlay {
    pub criteria: serde_json::Value,
    pub evaluation_sum: i64,
    pub scored_by: i64,
    pub scored_at: Option<chrono::DateTime<chrono::Utc>>,
}

// 单表单评估记录
#[derive(Debug, Clone, Serialize)]
pub struct EvaluationForm {
    pub id: i64,
    pub user_id: i64,
    pub category: EvaluationCategory,
    pub year: i32,
    pub criteria: serde_json::Value,
    pub aspects_sum: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scoring: Option<ScoringOverlay>,
    pub submitted_at: chrono::DateTime<chrono::Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_category_round_trip() {
        for category in EvaluationCategory::ALL {
            let parsed = EvaluationCategory::from_str(category.as_str()).unwrap();
            assert_eq!(parsed, *category);
        }
        assert!(EvaluationCategory::from_str("annual_review").is_err());
    }

    #[test]
    fn test_category_kinds() {
        assert_eq!(
            EvaluationCategory::AcademicLoad.kind(),
            CategoryKind::MultiEntry
        );
        assert_eq!(
            EvaluationCategory::EthicsResponsibility.kind(),
            CategoryKind::SingleForm
        );
    }

    #[test]
    fn test_only_single_forms_are_scoreable() {
        assert!(!EvaluationCategory::AcademicLoad.is_scoreable());
        assert!(!EvaluationCategory::ActivityLog.is_scoreable());
        assert!(EvaluationCategory::EvaluationAspects.is_scoreable());
        assert!(EvaluationCategory::ScientificProduction.is_scoreable());
    }
}
