//! 评分目录
//!
//! 定义每个单表单类别的子指标清单与取值上限，以及多条目类别的字段目录。
//! 所有求和都在服务端按目录重新计算，客户端传入的合计值一律不信任。

use serde_json::{Map, Value};

use super::entities::{EvaluationCategory, PublisherKind, ResearchType};
use crate::errors::{FacultyEvalError, Result};

/// 单表单类别的指标目录
pub struct FormCatalog {
    /// 子指标名，固定顺序
    pub criteria: &'static [&'static str],
    /// 每项指标允许的最大分值（最小为 0）
    pub max_per_criterion: i64,
}

/// 多条目类别的字段类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Integer,
    ResearchTypeTag,
    PublisherKindTag,
}

/// 多条目类别的字段定义
pub struct EntryFieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    pub required: bool,
}

const fn required(name: &'static str, kind: FieldKind) -> EntryFieldSpec {
    EntryFieldSpec {
        name,
        kind,
        required: true,
    }
}

const fn optional(name: &'static str, kind: FieldKind) -> EntryFieldSpec {
    EntryFieldSpec {
        name,
        kind,
        required: false,
    }
}

static EVALUATION_ASPECTS_CATALOG: FormCatalog = FormCatalog {
    criteria: &[
        "develop_courses",
        "prepare_course_file",
        "electronic_tests",
        "prepare_material_content",
        "effective_learning_use",
        "teaching_methods",
        "student_assessment_methods",
        "test_question_preparation",
        "academic_guidance",
    ],
    max_per_criterion: 10,
};

static ETHICS_RESPONSIBILITY_CATALOG: FormCatalog = FormCatalog {
    criteria: &[
        "professional_values",
        "offer_encouragement",
        "respect_leaders",
        "take_responsibility",
        "decent_appearance",
        "punctuality",
        "office_hours",
    ],
    max_per_criterion: 10,
};

static UNIVERSITY_EVALUATION_CATALOG: FormCatalog = FormCatalog {
    criteria: &[
        "department_load",
        "workshop_development",
        "program_bank",
        "medical_services",
    ],
    max_per_criterion: 10,
};

static SCIENTIFIC_PRODUCTION_CATALOG: FormCatalog = FormCatalog {
    criteria: &["scientific_research", "graduation_supervision"],
    max_per_criterion: 10,
};

static ACADEMIC_LOAD_FIELDS: &[EntryFieldSpec] = &[
    required("semester", FieldKind::Text),
    required("course_code", FieldKind::Text),
    required("course_name", FieldKind::Text),
    required("semester_type", FieldKind::Text),
    required("teaching_load", FieldKind::Text),
    optional("num_students", FieldKind::Integer),
    optional("credit_hours", FieldKind::Integer),
];

static ACTIVITY_LOG_FIELDS: &[EntryFieldSpec] = &[
    required("activity_title", FieldKind::Text),
    required("activity_date", FieldKind::Text),
    required("duration", FieldKind::Text),
    required("participation_type", FieldKind::Text),
    required("place", FieldKind::Text),
];

static PARTICIPATION_CONFERENCE_FIELDS: &[EntryFieldSpec] = &[
    required("location", FieldKind::Text),
    required("participation_type", FieldKind::Text),
    required("place", FieldKind::Text),
    required("event_year", FieldKind::Integer),
];

static UNIVERSITY_SERVICE_FIELDS: &[EntryFieldSpec] = &[
    required("task_level", FieldKind::Text),
    required("task_type", FieldKind::Text),
    optional("notes", FieldKind::Text),
];

static SCIENTIFIC_RESEARCH_FIELDS: &[EntryFieldSpec] = &[
    required("output_title", FieldKind::Text),
    required("authors", FieldKind::Text),
    required("publisher", FieldKind::Text),
    required("agency", FieldKind::Text),
    required("publication_year", FieldKind::Integer),
    required("research_type", FieldKind::ResearchTypeTag),
    required("publisher_kind", FieldKind::PublisherKindTag),
    optional("doi", FieldKind::Text),
];

/// 获取单表单类别的指标目录，多条目类别返回 None
pub fn form_catalog(category: EvaluationCategory) -> Option<&'static FormCatalog> {
    match category {
        EvaluationCategory::EvaluationAspects => Some(&EVALUATION_ASPECTS_CATALOG),
        EvaluationCategory::EthicsResponsibility => Some(&ETHICS_RESPONSIBILITY_CATALOG),
        EvaluationCategory::UniversityEvaluation => Some(&UNIVERSITY_EVALUATION_CATALOG),
        EvaluationCategory::ScientificProduction => Some(&SCIENTIFIC_PRODUCTION_CATALOG),
        _ => None,
    }
}

/// 获取多条目类别的字段目录，单表单类别返回 None
pub fn entry_fields(category: EvaluationCategory) -> Option<&'static [EntryFieldSpec]> {
    match category {
        EvaluationCategory::AcademicLoad => Some(ACADEMIC_LOAD_FIELDS),
        EvaluationCategory::ActivityLog => Some(ACTIVITY_LOG_FIELDS),
        EvaluationCategory::ParticipationConference => Some(PARTICIPATION_CONFERENCE_FIELDS),
        EvaluationCategory::UniversityService => Some(UNIVERSITY_SERVICE_FIELDS),
        EvaluationCategory::ScientificResearch => Some(SCIENTIFIC_RESEARCH_FIELDS),
        _ => None,
    }
}

/// 按目录计算子指标之和
///
/// 全有或全无：任一指标缺失、非整数或越界都会拒绝整份提交，
/// 不会把失败项默认为 0 后继续。
pub fn compute_sum(category: EvaluationCategory, fields: &Map<String, Value>) -> Result<i64> {
    let catalog = form_catalog(category).ok_or_else(|| {
        FacultyEvalError::validation(format!("类别 {category} 不是单表单类别，无法按指标求和"))
    })?;

    // 拒绝目录之外的字段
    for key in fields.keys() {
        if !catalog.criteria.contains(&key.as_str()) {
            return Err(FacultyEvalError::validation(format!(
                "未知指标: {key}"
            )));
        }
    }

    let mut sum = 0i64;
    for name in catalog.criteria {
        let value = fields.get(*name).ok_or_else(|| {
            FacultyEvalError::validation(format!("缺少指标: {name}"))
        })?;
        let score = value.as_i64().ok_or_else(|| {
            FacultyEvalError::validation(format!("指标 {name} 必须为整数"))
        })?;
        if score < 0 || score > catalog.max_per_criterion {
            return Err(FacultyEvalError::validation(format!(
                "指标 {name} 超出范围 [0, {}]: {score}",
                catalog.max_per_criterion
            )));
        }
        sum += score;
    }

    Ok(sum)
}

/// 多条目提交经目录校验后的结果
pub struct ValidatedEntry {
    pub payload: Value,
    pub research_type: Option<ResearchType>,
    pub publisher_kind: Option<PublisherKind>,
}

/// 校验多条目类别的提交字段
///
/// 同样全有或全无：必填字段缺失、类型不符或标签不在受控词汇内都整体拒绝。
pub fn validate_entry(
    category: EvaluationCategory,
    fields: &Map<String, Value>,
) -> Result<ValidatedEntry> {
    let specs = entry_fields(category).ok_or_else(|| {
        FacultyEvalError::validation(format!("类别 {category} 不接受多条目提交"))
    })?;

    for key in fields.keys() {
        if !specs.iter().any(|s| s.name == key.as_str()) {
            return Err(FacultyEvalError::validation(format!("未知字段: {key}")));
        }
    }

    let mut research_type = None;
    let mut publisher_kind = None;
    let mut payload = Map::new();

    for spec in specs {
        let value = match fields.get(spec.name) {
            Some(v) => v,
            None if spec.required => {
                return Err(FacultyEvalError::validation(format!(
                    "缺少必填字段: {}",
                    spec.name
                )));
            }
            None => continue,
        };

        match spec.kind {
            FieldKind::Text => {
                let text = value.as_str().ok_or_else(|| {
                    FacultyEvalError::validation(format!("字段 {} 必须为字符串", spec.name))
                })?;
                if spec.required && text.trim().is_empty() {
                    return Err(FacultyEvalError::validation(format!(
                        "字段 {} 不能为空",
                        spec.name
                    )));
                }
            }
            FieldKind::Integer => {
                let number = value.as_i64().ok_or_else(|| {
                    FacultyEvalError::validation(format!("字段 {} 必须为整数", spec.name))
                })?;
                if number < 0 {
                    return Err(FacultyEvalError::validation(format!(
                        "字段 {} 不能为负数",
                        spec.name
                    )));
                }
            }
            FieldKind::ResearchTypeTag => {
                let tag = value
                    .as_str()
                    .and_then(|s| s.parse::<ResearchType>().ok())
                    .ok_or_else(|| {
                        FacultyEvalError::validation(format!(
                            "字段 {} 必须为受控词汇之一: research, review",
                            spec.name
                        ))
                    })?;
                research_type = Some(tag);
            }
            FieldKind::PublisherKindTag => {
                let tag = value
                    .as_str()
                    .and_then(|s| s.parse::<PublisherKind>().ok())
                    .ok_or_else(|| {
                        FacultyEvalError::validation(format!(
                            "字段 {} 必须为受控词汇之一: conference, journal, other",
                            spec.name
                        ))
                    })?;
                publisher_kind = Some(tag);
            }
        }

        payload.insert(spec.name.to_string(), value.clone());
    }

    Ok(ValidatedEntry {
        payload: Value::Object(payload),
        research_type,
        publisher_kind,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields(value: Value) -> Map<String, Value> {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn test_ethics_sum() {
        let raw = fields(json!({
            "professional_values": 5,
            "offer_encouragement": 5,
            "respect_leaders": 5,
            "take_responsibility": 5,
            "decent_appearance": 5,
            "punctuality": 5,
            "office_hours": 5,
        }));
        assert_eq!(
            compute_sum(EvaluationCategory::EthicsResponsibility, &raw).unwrap(),
            35
        );
    }

    #[test]
    fn test_missing_criterion_rejected() {
        let raw = fields(json!({
            "professional_values": 5,
        }));
        let err = compute_sum(EvaluationCategory::EthicsResponsibility, &raw).unwrap_err();
        assert_eq!(err.code(), "E005");
    }

    #[test]
    fn test_non_integer_criterion_rejected_wholesale() {
        // 单个坏值会拒绝整份提交，而不是把它当 0
        let raw = fields(json!({
            "professional_values": 5,
            "offer_encouragement": "five",
            "respect_leaders": 5,
            "take_responsibility": 5,
            "decent_appearance": 5,
            "punctuality": 5,
            "office_hours": 5,
        }));
        assert!(compute_sum(EvaluationCategory::EthicsResponsibility, &raw).is_err());
    }

    #[test]
    fn test_float_criterion_rejected() {
        let raw = fields(json!({
            "department_load": 2.5,
            "workshop_development": 3,
            "program_bank": 3,
            "medical_services": 3,
        }));
        assert!(compute_sum(EvaluationCategory::UniversityEvaluation, &raw).is_err());
    }

    #[test]
    fn test_out_of_range_criterion_rejected() {
        let raw = fields(json!({
            "department_load": 11,
            "workshop_development": 3,
            "program_bank": 3,
            "medical_services": 3,
        }));
        assert!(compute_sum(EvaluationCategory::UniversityEvaluation, &raw).is_err());

        let raw = fields(json!({
            "department_load": -1,
            "workshop_development": 3,
            "program_bank": 3,
            "medical_services": 3,
        }));
        assert!(compute_sum(EvaluationCategory::UniversityEvaluation, &raw).is_err());
    }

    #[test]
    fn test_unknown_criterion_rejected() {
        let raw = fields(json!({
            "department_load": 3,
            "workshop_development": 3,
            "program_bank": 3,
            "medical_services": 3,
            "bonus": 10,
        }));
        assert!(compute_sum(EvaluationCategory::UniversityEvaluation, &raw).is_err());
    }

    #[test]
    fn test_multi_entry_category_has_no_sum() {
        let raw = fields(json!({}));
        assert!(compute_sum(EvaluationCategory::AcademicLoad, &raw).is_err());
    }

    #[test]
    fn test_validate_research_entry() {
        let raw = fields(json!({
            "output_title": "Deep learning in radiology",
            "authors": "A, B",
            "publisher": "IEEE EMBC",
            "agency": "IEEE",
            "publication_year": 2025,
            "research_type": "research",
            "publisher_kind": "conference",
        }));
        let validated = validate_entry(EvaluationCategory::ScientificResearch, &raw).unwrap();
        assert_eq!(validated.research_type, Some(ResearchType::Research));
        assert_eq!(validated.publisher_kind, Some(PublisherKind::Conference));
    }

    #[test]
    fn test_validate_research_entry_bad_tag() {
        let raw = fields(json!({
            "output_title": "t",
            "authors": "a",
            "publisher": "p",
            "agency": "g",
            "publication_year": 2025,
            "research_type": "بحث",
            "publisher_kind": "conference",
        }));
        assert!(validate_entry(EvaluationCategory::ScientificResearch, &raw).is_err());
    }

    #[test]
    fn test_validate_entry_missing_required() {
        let raw = fields(json!({
            "activity_title": "Workshop",
        }));
        assert!(validate_entry(EvaluationCategory::ActivityLog, &raw).is_err());
    }

    #[test]
    fn test_validate_entry_optional_field_may_be_absent() {
        let raw = fields(json!({
            "task_level": "college",
            "task_type": "committee",
        }));
        assert!(validate_entry(EvaluationCategory::UniversityService, &raw).is_ok());
    }

    #[test]
    fn test_validate_entry_unknown_field_rejected() {
        let raw = fields(json!({
            "task_level": "college",
            "task_type": "committee",
            "salary": 100,
        }));
        assert!(validate_entry(EvaluationCategory::UniversityService, &raw).is_err());
    }
}
