//! Wire types for the backend tenant-lookup endpoint
//!
//! `GET {api_url}/tenants/{slug}` answers with:
//!
//! ```json
//! {
//!   "found": true,
//!   "tenant": { "id": "...", "slug": "...", "name": "...", "heroTitle": null, ... },
//!   "plans": [ { "id": "...", "name": "...", "priceCents": 8990, ... } ],
//!   "suspended": false,
//!   "message": null
//! }
//! ```
//!
//! Only `id`, `slug` and `name` are guaranteed on a tenant record; every
//! content field may be missing or `null`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use boxclub_core::tenant::{FaqItem, FeatureItem, HowItWorksStep, Testimonial};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiTenantResponse {
    #[serde(default)]
    pub found: bool,
    #[serde(default)]
    pub tenant: Option<ApiTenant>,
    #[serde(default)]
    pub plans: Option<Vec<ApiPlan>>,
    #[serde(default)]
    pub suspended: Option<bool>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ApiTenantResponse {
    pub fn is_suspended(&self) -> bool {
        self.suspended.unwrap_or(false)
    }
}

/// Tenant record as stored by the backend
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiTenant {
    pub id: String,
    pub slug: String,
    pub name: String,

    #[serde(default)]
    pub domains: Option<Vec<String>>,

    // Branding
    #[serde(default)]
    pub logo_url: Option<String>,
    #[serde(default)]
    pub favicon_url: Option<String>,
    #[serde(default)]
    pub brand_line1: Option<String>,
    #[serde(default)]
    pub brand_line2: Option<String>,
    #[serde(default)]
    pub tagline: Option<String>,
    #[serde(default)]
    pub description: Option<String>,

    // Theme
    #[serde(default)]
    pub theme_slug: Option<String>,
    #[serde(default)]
    pub primary_color: Option<String>,
    #[serde(default)]
    pub secondary_color: Option<String>,
    #[serde(default)]
    pub background_color: Option<String>,
    #[serde(default)]
    pub foreground_color: Option<String>,

    #[serde(default)]
    pub features: Option<BTreeMap<String, bool>>,

    // Content
    #[serde(default)]
    pub hero_title: Option<String>,
    #[serde(default)]
    pub hero_subtitle: Option<String>,
    #[serde(default)]
    pub hero_cta: Option<String>,
    #[serde(default)]
    pub hero_images: Option<Vec<String>>,
    #[serde(default)]
    pub feature_list: Option<Vec<FeatureItem>>,
    #[serde(default)]
    pub how_it_works: Option<Vec<HowItWorksStep>>,
    #[serde(default)]
    pub testimonials: Option<Vec<Testimonial>>,
    #[serde(default)]
    pub faq: Option<Vec<FaqItem>>,

    // Contact
    #[serde(default)]
    pub contact_email: Option<String>,
    #[serde(default)]
    pub contact_phone: Option<String>,
    #[serde(default)]
    pub whatsapp: Option<String>,
    #[serde(default)]
    pub instagram: Option<String>,
    #[serde(default)]
    pub address: Option<String>,

    // Legal
    #[serde(default)]
    pub company_name: Option<String>,
    #[serde(default)]
    pub document: Option<String>,
    #[serde(default)]
    pub terms_url: Option<String>,
    #[serde(default)]
    pub privacy_url: Option<String>,

    // SEO
    #[serde(default)]
    pub seo_title: Option<String>,
    #[serde(default)]
    pub seo_description: Option<String>,
    #[serde(default)]
    pub seo_keywords: Option<Vec<String>>,
    #[serde(default)]
    pub og_image: Option<String>,

    // Checkout
    #[serde(default)]
    pub checkout_mode: Option<String>,
    #[serde(default)]
    pub checkout_url: Option<String>,
    #[serde(default)]
    pub cta_label: Option<String>,
    #[serde(default)]
    pub currency: Option<String>,
}

/// Plan record as stored by the backend
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiPlan {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub price: Option<f64>,
    /// Integer minor units; preferred over `price` when present
    #[serde(default)]
    pub price_cents: Option<i64>,
    #[serde(default)]
    pub original_price: Option<f64>,
    #[serde(default)]
    pub original_price_cents: Option<i64>,
    #[serde(default)]
    pub features: Option<Vec<String>>,
    #[serde(default)]
    pub highlighted: Option<bool>,
    #[serde(default)]
    pub badge: Option<String>,
    /// Per-plan checkout link
    #[serde(default)]
    pub checkout_url: Option<String>,
    #[serde(default)]
    pub sort_order: Option<i32>,
    #[serde(default)]
    pub active: Option<bool>,
}
