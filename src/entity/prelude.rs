//! 预导入模块，方便使用

pub use super::evaluation_entries::{
    ActiveModel as EvaluationEntryActiveModel, Entity as EvaluationEntries,
    Model as EvaluationEntryModel,
};
pub use super::evaluation_forms::{
    ActiveModel as EvaluationFormActiveModel, Entity as EvaluationForms,
    Model as EvaluationFormModel,
};
pub use super::users::{ActiveModel as UserActiveModel, Entity as Users, Model as UserModel};
