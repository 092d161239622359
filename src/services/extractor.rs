// src/services/extractor.rs
//! Keyword and pattern heuristics over free-text (mostly Arabic) messages.
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProjectKind {
    #[serde(rename = "موقع ويب")]
    Website,
    #[serde(rename = "تطبيق موبايل")]
    MobileApp,
    #[serde(rename = "نظام إدارة")]
    ManagementSystem,
    #[serde(rename = "تصميم جرافيكي")]
    GraphicDesign,
    #[serde(rename = "تطوير برمجي")]
    SoftwareDevelopment,
}

impl ProjectKind {
    pub fn label(self) -> &'static str {
        match self {
            ProjectKind::Website => "موقع ويب",
            ProjectKind::MobileApp => "تطبيق موبايل",
            ProjectKind::ManagementSystem => "نظام إدارة",
            ProjectKind::GraphicDesign => "تصميم جرافيكي",
            ProjectKind::SoftwareDevelopment => "تطوير برمجي",
        }
    }

    pub fn service(self) -> &'static str {
        match self {
            ProjectKind::Website => "Web Development",
            ProjectKind::MobileApp => "Mobile App Development",
            ProjectKind::ManagementSystem => "Management System",
            ProjectKind::GraphicDesign => "Graphic Design",
            ProjectKind::SoftwareDevelopment => "Software Development",
        }
    }

    pub fn default_price(self) -> &'static str {
        match self {
            ProjectKind::Website => "500-2000 دولار",
            ProjectKind::MobileApp => "1000-5000 دولار",
            ProjectKind::ManagementSystem => "800-3000 دولار",
            ProjectKind::GraphicDesign => "200-1000 دولار",
            ProjectKind::SoftwareDevelopment => "يحدد لاحقاً",
        }
    }

    pub fn default_time(self) -> &'static str {
        match self {
            ProjectKind::Website => "2-4 أسابيع",
            ProjectKind::MobileApp => "4-8 أسابيع",
            ProjectKind::ManagementSystem => "3-6 أسابيع",
            ProjectKind::GraphicDesign => "1-2 أسابيع",
            ProjectKind::SoftwareDevelopment => "يحدد لاحقاً",
        }
    }

    /// Feature options offered in the guided flow.
    pub fn options(self) -> &'static [&'static str] {
        match self {
            ProjectKind::Website => &[
                "موقع تعريفي (Portfolio)",
                "متجر إلكتروني (E-commerce)",
                "موقع إخباري أو مدونة",
                "موقع حجز مواعيد",
                "موقع شركة / خدمات",
            ],
            ProjectKind::MobileApp => &[
                "تطبيق iOS",
                "تطبيق Android",
                "تطبيق متعدد المنصات (Flutter/React Native)",
                "واجهة حديثة + قاعدة بيانات",
                "إشعارات Push وتحديثات",
            ],
            ProjectKind::ManagementSystem => &[
                "نظام إدارة العملاء (CRM)",
                "نظام إدارة المخزون",
                "نظام إدارة الموظفين",
                "نظام إدارة المبيعات",
                "لوحة تحكم + تقارير",
            ],
            ProjectKind::GraphicDesign => &[
                "تصميم شعار (Logo)",
                "هوية بصرية كاملة",
                "تصميم واجهات (UI/UX)",
                "إعلانات ومواد تسويقية",
            ],
            ProjectKind::SoftwareDevelopment => &[],
        }
    }
}

/// Contact details pulled out of a message. Fields the user didn't give stay `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_logo: Option<String>,
}

impl CustomerInfo {
    /// Enough to get back to the customer.
    pub fn has_contact(&self) -> bool {
        self.client_name.is_some()
            || self.company_name.is_some()
            || self.phone.is_some()
            || self.email.is_some()
    }

    pub fn is_empty(&self) -> bool {
        !self.has_contact() && self.has_logo.is_none()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BudgetAndTime {
    pub price: Option<String>,
    pub time: Option<String>,
}

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|e| panic!("invalid built-in pattern {pattern}: {e}"))
}

static WEBSITE_RE: LazyLock<Regex> = LazyLock::new(|| {
    compile(r"\b(موقع|ويب|website|web|متجر|متجر إلكتروني|e-?commerce|متجر أونلاين)\b")
});
static MOBILE_RE: LazyLock<Regex> = LazyLock::new(|| {
    compile(r"\b(تطبيق|app|موبايل|اندرويد|android|ايفون|iphone|ios|فلتر|flutter|رياكت نيتيف)\b")
});
static SYSTEM_RE: LazyLock<Regex> =
    LazyLock::new(|| compile(r"\b(نظام|إدارة|crm|مخزون|موظفين|مبيعات|system)\b"));
static DESIGN_RE: LazyLock<Regex> = LazyLock::new(|| {
    compile(r"\b(تصميم|جرافيك|شعار|لوغو|logo|هوية بصرية|ui|ux|اعلان|ماركتينغ|تسويق)\b")
});
static DEVELOPMENT_RE: LazyLock<Regex> = LazyLock::new(|| compile(r"\b(برمجة|تطوير|برمج)\b"));

static NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| compile(r"(?i)(?:اسم(?:ي| العميل)?|الاسم)\s*[:\-]?\s*([^\n،,\d]+)"));
static COMPANY_RE: LazyLock<Regex> =
    LazyLock::new(|| compile(r"(?i)(?:اسم الشركة|الشركة|شركة)\s*[:\-]?\s*([^\n،,]+)"));
static PHONE_LABEL_RE: LazyLock<Regex> = LazyLock::new(|| {
    compile(r"(?i)(?:هاتف|جوال|رقم|موبايل|تلفون)\s*[:\-]?\s*([0-9\x{0660}-\x{0669}\s\-+]{8,})")
});
static PHONE_BARE_RE: LazyLock<Regex> =
    LazyLock::new(|| compile(r"07[0-9]{8,9}|\+9647[0-9]{8,9}|0[0-9]{9,11}"));
static EMAIL_LABEL_RE: LazyLock<Regex> = LazyLock::new(|| {
    compile(r"(?i)(?:بريد|ايميل|إيميل|email)\s*[:\-]?\s*([^\s،,\n]+@[^\s،,\n]+)")
});
static EMAIL_BARE_RE: LazyLock<Regex> =
    LazyLock::new(|| compile(r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}"));
static LOGO_NO_RE: LazyLock<Regex> = LazyLock::new(|| {
    compile(
        r"(?i)\b(لا|ليس|لا يوجد|ما عندي|بدون)\b.*\b(شعار|لوجو|logo)\b|\b(شعار|لوجو|logo)\b.*\b(لا|بدون)\b",
    )
});
static LOGO_YES_RE: LazyLock<Regex> = LazyLock::new(|| {
    compile(
        r"(?i)\b(نعم|لدينا|موجود|عندي|لدي|يوجد)\b.*\b(شعار|لوجو|logo)\b|\b(شعار|لوجو|logo)\b.*\b(نعم|لدينا|موجود)\b",
    )
});

static PRICE_RE: LazyLock<Regex> =
    LazyLock::new(|| compile(r"(\d+)\s*(?:,\d+)?\s*(دولار|ريال|درهم|د\.ع)"));
static PRICE_RANGE_RE: LazyLock<Regex> =
    LazyLock::new(|| compile(r"(\d+)\s*-\s*(\d+)\s*(دولار|ريال)"));
static WEEKS_RE: LazyLock<Regex> =
    LazyLock::new(|| compile(r"(?i)(\d+)\s*(?:أسبوع|اسبوع|أسابيع|اسابيع|weeks?)"));
static MONTHS_RE: LazyLock<Regex> = LazyLock::new(|| compile(r"(\d+)\s*(?:شهر|أشهر|اشهر)"));

/// Classifies a message into one of the fixed project types, first match wins.
pub fn detect_project_type(text: &str) -> Option<ProjectKind> {
    let t = text.to_lowercase();
    [
        (&*WEBSITE_RE, ProjectKind::Website),
        (&*MOBILE_RE, ProjectKind::MobileApp),
        (&*SYSTEM_RE, ProjectKind::ManagementSystem),
        (&*DESIGN_RE, ProjectKind::GraphicDesign),
        (&*DEVELOPMENT_RE, ProjectKind::SoftwareDevelopment),
    ]
    .into_iter()
    .find(|(re, _)| re.is_match(&t))
    .map(|(_, kind)| kind)
}

const GUIDED_KEYWORDS: &[&str] = &[
    // website
    "موقع", "ويب", "website", "متجر",
    // app
    "تطبيق", "app", "موبايل", "اندرويد", "ايفون",
    // system
    "نظام", "إدارة", "crm",
    // design
    "تصميم", "جرافيك", "شعار", "لوغو", "هوية",
];

/// Whether a message asks for a project type that has a guided options list.
pub fn guided_project(text: &str) -> Option<ProjectKind> {
    let project = detect_project_type(text)?;
    let lower = text.to_lowercase();
    let asks = GUIDED_KEYWORDS.iter().any(|k| lower.contains(k));
    (asks && !project.options().is_empty()).then_some(project)
}

/// Whether a message talks about programming work in general.
pub fn mentions_development(text: &str) -> bool {
    let lower = text.to_lowercase();
    ["برمجة", "تطوير", "برمج"].iter().any(|k| lower.contains(k))
}

fn capture(re: &Regex, text: &str) -> Option<String> {
    re.captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|s| !s.is_empty())
}

pub fn extract_customer_info(text: &str) -> CustomerInfo {
    let t = text.trim();

    let phone = capture(&PHONE_LABEL_RE, t)
        .map(|p| p.chars().filter(|c| !c.is_whitespace()).collect::<String>())
        .filter(|p| !p.is_empty())
        .or_else(|| PHONE_BARE_RE.find(t).map(|m| m.as_str().to_string()));

    let email = capture(&EMAIL_LABEL_RE, t)
        .or_else(|| EMAIL_BARE_RE.find(t).map(|m| m.as_str().to_string()));

    // negation is checked first: "لا يوجد شعار" also contains the affirmative "يوجد"
    let has_logo = if LOGO_NO_RE.is_match(t) {
        Some("لا".to_string())
    } else if LOGO_YES_RE.is_match(t) {
        Some("نعم".to_string())
    } else {
        None
    };

    CustomerInfo {
        client_name: capture(&NAME_RE, t),
        company_name: capture(&COMPANY_RE, t),
        phone,
        email,
        has_logo,
    }
}

pub fn extract_budget_and_time(text: &str) -> BudgetAndTime {
    let mut result = BudgetAndTime::default();

    if let Some(m) = PRICE_RE.find(text) {
        result.price = Some(m.as_str().trim().to_string());
    }
    if let Some(c) = PRICE_RANGE_RE.captures(text) {
        result.price = Some(format!("{}-{} {}", &c[1], &c[2], &c[3]));
    }

    if let Some(c) = WEEKS_RE.captures(text) {
        result.time = Some(format!("{} أسابيع", &c[1]));
    } else if let Some(c) = MONTHS_RE.captures(text) {
        result.time = Some(format!("{} أشهر", &c[1]));
    }

    result
}
