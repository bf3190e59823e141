//! Tenant configuration model
//!
//! A `TenantConfig` is the complete presentation and business configuration
//! of one brand on the platform. The same shape is produced by the static
//! registry (definition files) and by the dynamic fetcher (backend API), so
//! presentation code never needs to know where a tenant came from.
//!
//! Serialized field names are camelCase to match both the definition files
//! and the backend wire format.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

use crate::theme::CustomColors;
use crate::{Error, Result};

/// Maximum accepted slug length
pub const MAX_SLUG_LEN: usize = 64;

static SLUG_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").expect("slug pattern is valid"));

/// Check whether a string is a URL-safe tenant slug (`[a-z0-9]` words joined by `-`)
pub fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty() && slug.len() <= MAX_SLUG_LEN && SLUG_PATTERN.is_match(slug)
}

fn default_theme_slug() -> String {
    "default".to_string()
}

/// Complete configuration of one tenant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantConfig {
    pub id: String,
    /// URL identifier, used in `/t/{slug}` paths
    pub slug: String,
    pub name: String,

    /// Dedicated hostnames bound to this tenant
    #[serde(default)]
    pub domains: Vec<String>,

    pub branding: Branding,

    #[serde(default = "default_theme_slug")]
    pub theme_slug: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_colors: Option<CustomColors>,

    /// Feature flags; absent flags read as `false`
    #[serde(default)]
    pub features: BTreeMap<String, bool>,

    pub hero: HeroSection,
    #[serde(default)]
    pub feature_list: Vec<FeatureItem>,
    #[serde(default)]
    pub how_it_works: Vec<HowItWorksStep>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub testimonials: Option<Vec<Testimonial>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub faq: Option<Vec<FaqItem>>,

    /// Plans in display order
    #[serde(default)]
    pub plans: Vec<PlanConfig>,

    #[serde(default)]
    pub contact: ContactInfo,
    #[serde(default)]
    pub legal: LegalInfo,
    #[serde(default)]
    pub seo: SeoConfig,
    #[serde(default)]
    pub subscription: SubscriptionConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Branding {
    pub logo: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub favicon: Option<String>,
    pub brand_text: BrandText,
    pub tagline: String,
    pub description: String,
}

/// Two-line brand wordmark
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrandText {
    pub line1: String,
    pub line2: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeroSection {
    pub title: String,
    pub subtitle: String,
    pub cta: String,
    #[serde(default)]
    pub images: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HowItWorksStep {
    pub step: u32,
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Testimonial {
    pub name: String,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<u8>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaqItem {
    pub question: String,
    pub answer: String,
}

/// One subscription plan offered by a tenant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanConfig {
    /// Unique within the tenant
    pub id: String,
    pub name: String,
    pub price: f64,
    /// Shown struck through next to `price`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_price: Option<f64>,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub highlighted: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub badge: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContactInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub whatsapp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instagram: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegalInfo {
    #[serde(default)]
    pub company_name: String,
    /// Company registration number
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub terms_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub privacy_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeoConfig {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub og_image: Option<String>,
}

/// How checkout is presented to the visitor
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckoutMode {
    /// Redirect to an external checkout URL
    #[default]
    Link,
    /// Checkout rendered inside the storefront
    Embedded,
}

fn default_cta_label() -> String {
    "Assinar".to_string()
}

fn default_currency() -> String {
    "BRL".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionConfig {
    #[serde(default)]
    pub mode: CheckoutMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checkout_url: Option<String>,
    /// Plan id -> checkout URL, overriding `checkout_url`
    #[serde(default)]
    pub plan_checkout_urls: BTreeMap<String, String>,
    #[serde(default = "default_cta_label")]
    pub cta_label: String,
    #[serde(default = "default_currency")]
    pub currency: String,
}

impl Default for SubscriptionConfig {
    fn default() -> Self {
        Self {
            mode: CheckoutMode::default(),
            checkout_url: None,
            plan_checkout_urls: BTreeMap::new(),
            cta_label: default_cta_label(),
            currency: default_currency(),
        }
    }
}

impl TenantConfig {
    /// Read a feature flag (absent means disabled)
    pub fn feature(&self, name: &str) -> bool {
        self.features.get(name).copied().unwrap_or(false)
    }

    /// Names of all enabled feature flags
    pub fn enabled_features(&self) -> Vec<&str> {
        self.features
            .iter()
            .filter(|(_, enabled)| **enabled)
            .map(|(name, _)| name.as_str())
            .collect()
    }

    /// Look up a plan by id
    pub fn plan(&self, plan_id: &str) -> Option<&PlanConfig> {
        self.plans.iter().find(|p| p.id == plan_id)
    }

    /// Whether checkout flows can run for this tenant
    pub fn has_checkout(&self) -> bool {
        !self.plans.is_empty()
    }

    /// Checkout URL for a plan: the per-plan override, else the generic URL
    pub fn checkout_url(&self, plan_id: &str) -> Option<&str> {
        self.subscription
            .plan_checkout_urls
            .get(plan_id)
            .or(self.subscription.checkout_url.as_ref())
            .map(String::as_str)
    }

    /// Case-insensitive match of an already normalized host against `domains`
    pub fn serves_domain(&self, host: &str) -> bool {
        self.domains.iter().any(|d| d.eq_ignore_ascii_case(host))
    }

    /// Check the per-tenant invariants
    ///
    /// # Errors
    /// - `Error::InvalidTenant` if the slug is not URL-safe or the name is empty
    /// - `Error::ConfigValidation` if two plans share an id
    pub fn validate(&self) -> Result<()> {
        if !is_valid_slug(&self.slug) {
            return Err(Error::InvalidTenant(format!(
                "slug '{}' is not URL-safe",
                self.slug
            )));
        }

        if self.name.trim().is_empty() {
            return Err(Error::InvalidTenant(format!(
                "tenant '{}' has an empty name",
                self.slug
            )));
        }

        let mut seen = HashSet::new();
        for plan in &self.plans {
            if !seen.insert(plan.id.as_str()) {
                return Err(Error::ConfigValidation(format!(
                    "tenant '{}' has duplicate plan id '{}'",
                    self.slug, plan.id
                )));
            }
        }

        Ok(())
    }
}
