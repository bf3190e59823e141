//! Adapter from the backend tenant record to `TenantConfig`
//!
//! Tenants onboarded after deployment only exist in the backend, and their
//! records are sparse. The adapter fills every missing content field with a
//! brand-neutral default built from the tenant's name, so presentation code
//! never has to null-check content.

use std::collections::BTreeMap;

use boxclub_core::{
    CustomColors, PlanConfig, TenantConfig,
    tenant::{
        BrandText, Branding, CheckoutMode, ContactInfo, HeroSection, LegalInfo, SeoConfig,
        SubscriptionConfig,
    },
    theme::DEFAULT_THEME_SLUG,
};

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::warn;

use crate::api::{ApiPlan, ApiTenant};

const DEFAULT_LOGO: &str = "/images/default-logo.svg";
const DEFAULT_HERO_CTA: &str = "Assinar agora";

/// `Some(s)` only if `s` has visible content
fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

static COLOR_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?:#[0-9a-fA-F]{3,8}|(?:rgb|rgba|hsl|hsla)\([0-9.,%/ a-z-]*\)|[a-zA-Z]{3,20})$",
    )
    .expect("color pattern is valid")
});

/// Keep a backend colour only if it is a plain CSS colour value
///
/// Colours end up inside generated stylesheets, so anything other than a hex
/// code, an `rgb()`/`hsl()` function or a named colour is dropped.
fn css_color(slug: &str, field: &str, value: Option<String>) -> Option<String> {
    let value = non_blank(value)?;
    let trimmed = value.trim();
    if COLOR_PATTERN.is_match(trimmed) {
        Some(trimmed.to_string())
    } else {
        warn!("Dropping invalid {} colour for tenant '{}': {:?}", field, slug, value);
        None
    }
}

fn cents_to_amount(cents: i64) -> f64 {
    cents as f64 / 100.0
}

/// Split a name into the two-line wordmark: first word, then the rest
fn brand_lines(name: &str) -> (String, String) {
    let name = name.trim();
    match name.split_once(char::is_whitespace) {
        Some((first, rest)) => (first.to_string(), rest.trim().to_string()),
        None => (name.to_string(), String::new()),
    }
}

fn parse_checkout_mode(mode: Option<&str>) -> CheckoutMode {
    match mode.map(|m| m.trim().to_ascii_lowercase()).as_deref() {
        Some("embedded") => CheckoutMode::Embedded,
        _ => CheckoutMode::Link,
    }
}

fn adapt_plan(plan: ApiPlan) -> PlanConfig {
    let price = plan
        .price_cents
        .map(cents_to_amount)
        .or(plan.price)
        .unwrap_or(0.0);
    let original_price = plan
        .original_price_cents
        .map(cents_to_amount)
        .or(plan.original_price)
        .filter(|original| *original > price);

    PlanConfig {
        id: plan.id,
        name: plan.name,
        price,
        original_price,
        features: plan.features.unwrap_or_default(),
        highlighted: plan.highlighted.unwrap_or(false),
        badge: non_blank(plan.badge),
    }
}

/// Convert a backend tenant record plus its plans into a `TenantConfig`
///
/// Plans are ordered by `sortOrder` (plans without one keep their relative
/// order after the sorted ones) and inactive plans are dropped. Per-plan
/// checkout URLs become `subscription.planCheckoutUrls` entries.
pub fn adapt_api_tenant(tenant: ApiTenant, plans: Vec<ApiPlan>) -> TenantConfig {
    let name = tenant.name.trim().to_string();

    let mut plans: Vec<ApiPlan> = plans
        .into_iter()
        .filter(|p| p.active.unwrap_or(true))
        .collect();
    plans.sort_by_key(|p| p.sort_order.unwrap_or(i32::MAX));

    let plan_checkout_urls: BTreeMap<String, String> = plans
        .iter()
        .filter_map(|p| {
            non_blank(p.checkout_url.clone()).map(|url| (p.id.clone(), url))
        })
        .collect();
    let plans: Vec<PlanConfig> = plans.into_iter().map(adapt_plan).collect();

    let custom_colors = CustomColors {
        primary: css_color(&tenant.slug, "primary", tenant.primary_color),
        secondary: css_color(&tenant.slug, "secondary", tenant.secondary_color),
        background: css_color(&tenant.slug, "background", tenant.background_color),
        foreground: css_color(&tenant.slug, "foreground", tenant.foreground_color),
    };

    let (default_line1, default_line2) = brand_lines(&name);
    let tagline = non_blank(tenant.tagline)
        .unwrap_or_else(|| format!("O clube de assinatura {}", name));
    let description = non_blank(tenant.description)
        .unwrap_or_else(|| format!("Conheça os planos de assinatura do {}.", name));

    let branding = Branding {
        logo: non_blank(tenant.logo_url).unwrap_or_else(|| DEFAULT_LOGO.to_string()),
        favicon: non_blank(tenant.favicon_url),
        brand_text: BrandText {
            line1: non_blank(tenant.brand_line1).unwrap_or(default_line1),
            line2: non_blank(tenant.brand_line2).unwrap_or(default_line2),
        },
        tagline: tagline.clone(),
        description: description.clone(),
    };

    let hero = HeroSection {
        title: non_blank(tenant.hero_title).unwrap_or_else(|| format!("Bem-vindo ao {}", name)),
        subtitle: non_blank(tenant.hero_subtitle).unwrap_or_else(|| tagline.clone()),
        cta: non_blank(tenant.hero_cta).unwrap_or_else(|| DEFAULT_HERO_CTA.to_string()),
        images: tenant.hero_images.unwrap_or_default(),
    };

    let contact = ContactInfo {
        email: non_blank(tenant.contact_email),
        phone: non_blank(tenant.contact_phone),
        whatsapp: non_blank(tenant.whatsapp),
        instagram: non_blank(tenant.instagram),
        address: non_blank(tenant.address),
    };

    let legal = LegalInfo {
        company_name: non_blank(tenant.company_name).unwrap_or_else(|| name.clone()),
        document: non_blank(tenant.document),
        terms_url: non_blank(tenant.terms_url),
        privacy_url: non_blank(tenant.privacy_url),
    };

    let seo = SeoConfig {
        title: non_blank(tenant.seo_title).unwrap_or_else(|| format!("{} | {}", name, tagline)),
        description: non_blank(tenant.seo_description).unwrap_or(description),
        keywords: tenant.seo_keywords.unwrap_or_default(),
        og_image: non_blank(tenant.og_image),
    };

    let defaults = SubscriptionConfig::default();
    let subscription = SubscriptionConfig {
        mode: parse_checkout_mode(tenant.checkout_mode.as_deref()),
        checkout_url: non_blank(tenant.checkout_url),
        plan_checkout_urls,
        cta_label: non_blank(tenant.cta_label).unwrap_or(defaults.cta_label),
        currency: non_blank(tenant.currency).unwrap_or(defaults.currency),
    };

    TenantConfig {
        id: tenant.id,
        slug: tenant.slug,
        name,
        domains: tenant.domains.unwrap_or_default(),
        branding,
        theme_slug: non_blank(tenant.theme_slug)
            .unwrap_or_else(|| DEFAULT_THEME_SLUG.to_string()),
        custom_colors: (!custom_colors.is_empty()).then_some(custom_colors),
        features: tenant.features.unwrap_or_default(),
        hero,
        feature_list: tenant.feature_list.unwrap_or_default(),
        how_it_works: tenant.how_it_works.unwrap_or_default(),
        testimonials: tenant.testimonials.filter(|t| !t.is_empty()),
        faq: tenant.faq.filter(|f| !f.is_empty()),
        plans,
        contact,
        legal,
        seo,
        subscription,
    }
}
