//! Slug generation for back-office catalog URLs.
//!
//! Product and category names are mostly Bulgarian, so Cyrillic is
//! transliterated with the Bulgarian streamlined system before normalizing to
//! lowercase `a-z0-9-` with collapsing separators.

use axum::{
    Json,
    extract::Query,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use super::auth::{AuthError, types::ErrorResponse};

pub const SLUG_MIN_LEN: usize = 1;
pub const SLUG_MAX_LEN: usize = 96;

#[derive(Deserialize, Debug, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SlugQuery {
    /// Free text to turn into a slug, e.g. a product name.
    pub text: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct SlugResponse {
    pub slug: String,
}

#[utoipa::path(
    get,
    path = "/api/admin/slug",
    params(SlugQuery),
    responses(
        (status = 200, description = "Slug generated", body = SlugResponse),
        (status = 400, description = "Text has nothing to slugify", body = ErrorResponse),
        (status = 401, description = "No valid session", body = ErrorResponse)
    ),
    tag = "catalog"
)]
pub async fn slug(query: Option<Query<SlugQuery>>) -> Response {
    // A missing or malformed query gets the same JSON 400 as unusable text.
    let Some(Query(query)) = query else {
        return AuthError::BadRequest.into_response();
    };
    match slugify(&query.text, SLUG_MIN_LEN, SLUG_MAX_LEN) {
        Some(slug) => (StatusCode::OK, Json(SlugResponse { slug })).into_response(),
        None => AuthError::BadRequest.into_response(),
    }
}

/// Transliterates Bulgarian Cyrillic and normalizes the result into a URL-safe
/// slug within `min..=max` characters.
///
/// Returns `None` when nothing slug-worthy remains.
#[must_use]
pub fn slugify(input: &str, min: usize, max: usize) -> Option<String> {
    normalize_slug(&transliterate(input), min, max)
}

fn transliterate(input: &str) -> String {
    let chars: Vec<char> = input.chars().flat_map(char::to_lowercase).collect();
    let mut out = String::with_capacity(input.len());
    let mut i = 0;
    while i < chars.len() {
        // Word-final "ия" is written "ia" (София -> sofia).
        if chars[i] == 'и'
            && chars.get(i + 1) == Some(&'я')
            && !chars.get(i + 2).is_some_and(|next| next.is_alphanumeric())
        {
            out.push_str("ia");
            i += 2;
            continue;
        }
        match cyrillic_to_latin(chars[i]) {
            Some(latin) => out.push_str(latin),
            None => out.push(chars[i]),
        }
        i += 1;
    }
    out
}

const fn cyrillic_to_latin(ch: char) -> Option<&'static str> {
    let latin = match ch {
        'а' => "a",
        'б' => "b",
        'в' => "v",
        'г' => "g",
        'д' => "d",
        'е' => "e",
        'ж' => "zh",
        'з' => "z",
        'и' => "i",
        'й' => "y",
        'к' => "k",
        'л' => "l",
        'м' => "m",
        'н' => "n",
        'о' => "o",
        'п' => "p",
        'р' => "r",
        'с' => "s",
        'т' => "t",
        'у' => "u",
        'ф' => "f",
        'х' => "h",
        'ц' => "ts",
        'ч' => "ch",
        'ш' => "sh",
        'щ' => "sht",
        'ъ' => "a",
        'ь' => "y",
        'ю' => "yu",
        'я' => "ya",
        _ => return None,
    };
    Some(latin)
}

fn normalize_slug(input: &str, min: usize, max: usize) -> Option<String> {
    let mut slug = String::new();
    let mut prev_dash = false;
    for ch in input.trim().to_lowercase().chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch);
            prev_dash = false;
        } else if !prev_dash {
            slug.push('-');
            prev_dash = true;
        }
    }
    let trimmed = slug.trim_matches('-');
    if trimmed.is_empty() {
        return None;
    }
    let truncated: String = trimmed.chars().take(max).collect();
    let normalized = truncated.trim_matches('-').to_string();
    if normalized.len() < min || normalized.len() > max {
        return None;
    }
    Some(normalized)
}
