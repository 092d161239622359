// src/services/dialogue.rs
//! Guided request flow: project type → options → customer details → request.
use serde::{Deserialize, Serialize};

use super::extractor::{BudgetAndTime, CustomerInfo, ProjectKind};
use crate::storage::requests::{NewRequest, Request};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DraftStep {
    Options,
    Customer,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DialogueDraft {
    pub step: DraftStep,
    pub project: ProjectKind,
    #[serde(default)]
    pub selected_options: Option<String>,
    pub description: String,
}

/// Checkbox list the front end renders under an assistant reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionsWidget {
    pub options: Vec<String>,
    pub project: ProjectKind,
    pub description: String,
}

/// Result of feeding customer details to a draft.
#[derive(Debug, Clone, PartialEq)]
pub enum CustomerStep {
    Completed(Request),
    NeedsMore(DialogueDraft),
}

impl DialogueDraft {
    pub fn start(project: ProjectKind, description: impl Into<String>) -> Self {
        Self {
            step: DraftStep::Options,
            project,
            selected_options: None,
            description: description.into(),
        }
    }

    pub fn options_widget(&self) -> OptionsWidget {
        OptionsWidget {
            options: self.project.options().iter().map(|s| s.to_string()).collect(),
            project: self.project,
            description: self.description.clone(),
        }
    }

    /// Any message while waiting for options counts as the selection.
    pub fn select_options(self, selection: &str) -> Self {
        let selection = selection.trim().to_string();
        let description = if self.description.trim().is_empty() {
            selection.clone()
        } else {
            self.description
        };
        Self {
            step: DraftStep::Customer,
            project: self.project,
            selected_options: Some(selection),
            description,
        }
    }

    /// Turns the draft into a request once at least one contact field is known.
    pub fn submit_customer(self, info: CustomerInfo, budget: &BudgetAndTime) -> CustomerStep {
        if !info.has_contact() {
            return CustomerStep::NeedsMore(self);
        }
        let description = match &self.selected_options {
            Some(opts) => format!("{opts} | {}", self.description),
            None => self.description.clone(),
        };
        CustomerStep::Completed(build_request(
            self.project,
            description,
            self.selected_options,
            info,
            budget,
        ))
    }
}

pub fn build_request(
    project: ProjectKind,
    description: String,
    selected_options: Option<String>,
    customer_info: CustomerInfo,
    budget: &BudgetAndTime,
) -> Request {
    Request::create(NewRequest {
        kind: project.label().to_string(),
        description,
        service: project.service().to_string(),
        estimated_price: budget
            .price
            .clone()
            .unwrap_or_else(|| project.default_price().to_string()),
        estimated_time: budget
            .time
            .clone()
            .unwrap_or_else(|| project.default_time().to_string()),
        selected_options,
        customer_info,
    })
}

const CONTACT_CHECKLIST: &str = "- **اسمك** (أو اسم العميل)\n- **اسم الشركة** (إن وجد)\n- **رقم الهاتف**\n- **البريد الإلكتروني** (إن وجد)\n";

pub fn options_prompt(project: ProjectKind) -> String {
    format!("ممتاز! أفهم أنك تريد **{}**. ضع ✓ أمام كل ما تريده في الموقع:\n\n", project.label())
}

pub fn customer_info_prompt(selected: &str) -> String {
    let mut text = format!("ممتاز! اخترت: **{selected}**\n\n");
    text.push_str("لإكمال الطلب وإرساله للداشبورد، أحتاج منك:\n\n");
    text.push_str(CONTACT_CHECKLIST);
    text.push_str("- **هل لديكم شعار أو لوجو نستخدمه في الموقع؟** (نعم/لا)\n\n");
    text.push_str("أرسل البيانات في رسالة واحدة وسأجهز الطلب.");
    text
}

pub fn missing_contact_prompt() -> String {
    let mut text = String::from("لم أستطع استخراج بيانات كافية. يرجى إرسال:\n\n");
    text.push_str(CONTACT_CHECKLIST);
    text.push_str("- **هل لديكم شعار أو لوجو نستخدمه؟** (نعم/لا)\n\n");
    text.push_str("يمكنك كتابتها في رسالة واحدة، مثال:\nاسمي أحمد، شركة النور، هاتف 07701234567، بريد ahmed@company.com، لا يوجد شعار.");
    text
}

pub fn request_received_summary(request: &Request) -> String {
    let mut text = String::from("تم استلام بياناتك بنجاح. ✅\n\n**ملخص الطلب:**\n");
    text.push_str(&format!("- النوع: {}\n", request.kind));
    if let Some(opts) = &request.selected_options {
        text.push_str(&format!("- الخيارات: {opts}\n"));
    }
    text.push_str(&format!("- التكلفة المتوقعة: {}\n", request.estimated_price));
    text.push_str(&format!("- المدة المتوقعة: {}\n\n", request.estimated_time));

    let info = &request.customer_info;
    let fields = [
        ("اسم العميل", &info.client_name),
        ("اسم الشركة", &info.company_name),
        ("رقم الهاتف", &info.phone),
        ("البريد الإلكتروني", &info.email),
        ("شعار/لوجو", &info.has_logo),
    ];
    for (label, value) in fields {
        if let Some(value) = value {
            text.push_str(&format!("- **{label}:** {value}\n"));
        }
    }
    text.push_str("\n✅ **تم إرسال الطلب للداشبورد** وسنتواصل معك قريباً.");
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selection_moves_draft_to_customer_step() {
        let draft = DialogueDraft::start(ProjectKind::Website, "أريد موقع");
        let next = draft.select_options("متجر إلكتروني (E-commerce)");
        assert_eq!(next.step, DraftStep::Customer);
        assert_eq!(next.selected_options.as_deref(), Some("متجر إلكتروني (E-commerce)"));
        assert_eq!(next.description, "أريد موقع");
    }

    #[test]
    fn missing_contact_keeps_draft() {
        let draft = DialogueDraft::start(ProjectKind::MobileApp, "تطبيق").select_options("تطبيق iOS");
        match draft.clone().submit_customer(CustomerInfo::default(), &BudgetAndTime::default()) {
            CustomerStep::NeedsMore(d) => assert_eq!(d, draft),
            CustomerStep::Completed(_) => panic!("request created without contact details"),
        }
    }

    #[test]
    fn completed_request_uses_defaults_and_joined_description() {
        let draft = DialogueDraft::start(ProjectKind::Website, "أريد موقع").select_options("موقع حجز مواعيد");
        let info = CustomerInfo {
            phone: Some("07701234567".into()),
            ..Default::default()
        };
        let CustomerStep::Completed(request) = draft.submit_customer(info, &BudgetAndTime::default())
        else {
            panic!("expected a request");
        };
        assert_eq!(request.kind, "موقع ويب");
        assert_eq!(request.description, "موقع حجز مواعيد | أريد موقع");
        assert_eq!(request.estimated_price, "500-2000 دولار");
        assert_eq!(request.estimated_time, "2-4 أسابيع");
        assert!(request_received_summary(&request).contains("07701234567"));
    }
}
