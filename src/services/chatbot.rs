// src/services/chatbot.rs
//! Local rule-based responder. Answers every turn when no completion service is
//! configured and drives the guided flow whenever a draft is open.
use super::dialogue::{
    CustomerStep, DialogueDraft, DraftStep, OptionsWidget, build_request, customer_info_prompt,
    missing_contact_prompt, options_prompt, request_received_summary,
};
use super::extractor::{
    BudgetAndTime, detect_project_type, extract_budget_and_time, extract_customer_info,
    guided_project, mentions_development,
};
use crate::storage::history::{HistoryEntry, HistoryRole};
use crate::storage::requests::Request;

/// One assistant turn: the reply plus whatever the turn produced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Turn {
    pub reply: String,
    pub options_widget: Option<OptionsWidget>,
    pub request: Option<Request>,
    /// Draft to keep for the next turn; `None` means idle.
    pub draft: Option<DialogueDraft>,
}

impl Turn {
    fn text(reply: String) -> Self {
        Self { reply, ..Default::default() }
    }
}

pub fn generate_reply(
    draft: Option<DialogueDraft>,
    user_msg: &str,
    history: &[HistoryEntry],
) -> Turn {
    let budget = extract_budget_and_time(user_msg);

    match draft {
        Some(draft) if draft.step == DraftStep::Customer => {
            let info = extract_customer_info(user_msg);
            match draft.submit_customer(info, &budget) {
                CustomerStep::Completed(request) => Turn {
                    reply: request_received_summary(&request),
                    request: Some(request),
                    ..Default::default()
                },
                CustomerStep::NeedsMore(draft) => Turn {
                    reply: missing_contact_prompt(),
                    draft: Some(draft),
                    ..Default::default()
                },
            }
        }
        Some(draft) => {
            let next = draft.select_options(user_msg);
            let selected = next.selected_options.clone().unwrap_or_default();
            Turn {
                reply: customer_info_prompt(&selected),
                draft: Some(next),
                ..Default::default()
            }
        }
        None => idle_reply(user_msg, history, &budget),
    }
}

/// Starts the guided flow when the message names a project type with options.
pub fn start_guided_flow(user_msg: &str) -> Option<Turn> {
    let project = guided_project(user_msg)?;
    let draft = DialogueDraft::start(project, user_msg);
    Some(Turn {
        reply: options_prompt(project),
        options_widget: Some(draft.options_widget()),
        request: None,
        draft: Some(draft),
    })
}

fn idle_reply(user_msg: &str, history: &[HistoryEntry], budget: &BudgetAndTime) -> Turn {
    if let Some(turn) = start_guided_flow(user_msg) {
        return turn;
    }

    let project = detect_project_type(user_msg);
    let last_user = history
        .iter()
        .rev()
        .find(|e| e.role == HistoryRole::User)
        .map(|e| e.content.as_str())
        .unwrap_or("");

    // follow-up to an earlier message: merge both into one request
    let combined = if last_user.chars().count() > 10 {
        format!("{last_user} | {user_msg}")
    } else {
        user_msg.to_string()
    };
    let context_project = detect_project_type(&combined)
        .or_else(|| detect_project_type(last_user))
        .or(project);
    let has_detail =
        budget.price.is_some() || budget.time.is_some() || user_msg.chars().count() > 20;

    if let Some(context_project) = context_project.filter(|_| history.len() >= 2 && has_detail) {
        let context_budget = extract_budget_and_time(last_user);
        let merged = BudgetAndTime {
            price: context_budget.price.or_else(|| budget.price.clone()),
            time: context_budget.time.or_else(|| budget.time.clone()),
        };
        let info = extract_customer_info(&format!("{combined} {user_msg}"));
        let description = if last_user.is_empty() { user_msg.to_string() } else { combined };
        let request = build_request(context_project, description, None, info, &merged);
        return Turn {
            reply: updated_request_summary(&request),
            request: Some(request),
            ..Default::default()
        };
    }

    if project.is_some() && mentions_development(user_msg) {
        return Turn::text(
            "فهمت أنك تبحث عن تطوير برمجي. يمكننا مساعدتك في مواقع، تطبيقات، وأنظمة إدارة.\n\n\
             صف لي المشروع (نوع، مميزات، ميزانية إن وجدت)، أو اختر \"موقع ويب\" أو \"تطبيق موبايل\" من البداية لأعرض لك الخيارات وأخذ بياناتك."
                .to_string(),
        );
    }

    let mut reply = String::from("شكراً لرسالتك! لأخدمك بشكل أفضل:\n\n");
    reply.push_str("- اذكر **نوع المشروع**: موقع ويب، متجر إلكتروني، تطبيق موبايل، نظام إدارة، أو تصميم (شعار/هوية).\n");
    reply.push_str("- سأعرض لك **خيارات التطوير** حسب النوع لتختار ما تريد.\n");
    reply.push_str("- ثم سأطلب **اسمك، اسم الشركة، رقم الهاتف، البريد الإلكتروني، وهل لديكم شعار** لإكمال الطلب. 😊");

    let request = project.filter(|_| user_msg.chars().count() > 30).map(|project| {
        build_request(
            project,
            user_msg.to_string(),
            None,
            extract_customer_info(user_msg),
            budget,
        )
    });
    if request.is_some() {
        reply.push_str("\n\n✅ **تم إنشاء طلب مبدئي!** سيتم إرساله للداشبورد. إن أردت نأخذ بياناتك بالتفصيل، ابدأ من جديد بذكر نوع المشروع.");
    }

    Turn { reply, request, ..Default::default() }
}

fn updated_request_summary(request: &Request) -> String {
    let mut reply = format!(
        "تم تحديث الطلب. ✅\n\n**ملخص:** {} | {} | {}\n",
        request.kind, request.estimated_price, request.estimated_time
    );
    let info = &request.customer_info;
    if !info.is_empty() {
        reply.push_str("\n**بيانات العميل:**\n");
        let fields = [
            ("الاسم", &info.client_name),
            ("الشركة", &info.company_name),
            ("الهاتف", &info.phone),
            ("البريد", &info.email),
            ("شعار", &info.has_logo),
        ];
        for (label, value) in fields {
            if let Some(value) = value {
                reply.push_str(&format!("- {label}: {value}\n"));
            }
        }
    }
    reply.push_str("\n✅ **تم إرسال الطلب للداشبورد.**");
    reply
}
