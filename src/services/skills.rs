//! Skills shown on the portfolio.

use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::{ColumnTrait, Set};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::entity::skill;
use crate::error::{Error, Result};
use crate::repository::{
    DeleteOptions, Filter, FindOptions, PageInfo, PageQuery, Paginated, Repository,
};

/// Characters that carry meaning in skill names and would otherwise be lost.
const SPECIAL_CHARS: &[(char, &str)] = &[('#', " sharp"), ('+', " plus")];

/// URL-safe key for a label: `"C#"` → `"c-sharp"`, `"Node.js"` → `"nodejs"`.
///
/// ASCII letters and digits are kept (lower-cased), whitespace runs become a
/// single `-`, and everything else is dropped.
pub fn slugify(label: &str) -> String {
    let mut expanded = String::with_capacity(label.len());
    for c in label.chars() {
        match SPECIAL_CHARS.iter().find(|(special, _)| *special == c) {
            Some((_, replacement)) => expanded.push_str(replacement),
            None => expanded.push(c),
        }
    }

    expanded
        .split_whitespace()
        .map(|word| {
            word.chars()
                .filter(char::is_ascii_alphanumeric)
                .map(|c| c.to_ascii_lowercase())
                .collect::<String>()
        })
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

/// Skill as returned to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormattedSkill {
    pub slug: String,
    pub label: String,
    pub icon_url: Option<String>,
    pub category: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
    pub deleted_at: Option<DateTimeWithTimeZone>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSkill {
    pub label: String,
    pub icon_url: Option<String>,
    pub category: Option<String>,
}

#[derive(Debug, Clone)]
pub struct SkillsService {
    skills: Repository<skill::Entity>,
}

impl SkillsService {
    pub fn new(skills: Repository<skill::Entity>) -> Self {
        Self { skills }
    }

    pub async fn get_skills(&self, query: PageQuery) -> Result<Paginated<skill::Model>> {
        let window = self.skills.get_pagination_params(query);
        let data = self
            .skills
            .find_many(Filter::All, FindOptions::paginated(window))
            .await?;
        let total = self.skills.count(Filter::All, FindOptions::default()).await?;
        Ok(Paginated {
            data,
            pagination: PageInfo::new(query, window, total),
        })
    }

    /// Create a skill keyed by the slug of its label.
    ///
    /// The slug of a deleted skill stays taken.
    pub async fn create_skill(&self, data: NewSkill) -> Result<skill::Model> {
        let slug = slugify(&data.label);
        if slug.is_empty() {
            return Err(Error::BadRequest(format!(
                "Label \"{}\" does not produce a valid slug",
                data.label
            )));
        }

        let existing = self
            .skills
            .find_one(skill::Column::Slug.eq(slug.as_str()), FindOptions::including_deleted())
            .await?;
        if existing.is_some() {
            return Err(Error::Conflict(format!(
                "Skill with slug \"{slug}\" already exists"
            )));
        }

        let skill = self
            .skills
            .create(skill::ActiveModel {
                slug: Set(slug),
                label: Set(data.label),
                icon_url: Set(data.icon_url.filter(|v| !v.is_empty())),
                category: Set(data.category.filter(|v| !v.is_empty())),
                ..Default::default()
            })
            .await?;

        info!(slug = %skill.slug, "skill created");
        Ok(skill)
    }

    /// Soft-delete a skill.
    pub async fn delete_skill(&self, slug: &str) -> Result<()> {
        let filter = skill::Column::Slug.eq(slug);
        if self.skills.find_one(filter.clone(), FindOptions::default()).await?.is_none() {
            return Err(Error::NotFound("Skill not found".into()));
        }
        self.skills.delete(filter, DeleteOptions::default()).await?;
        info!(slug, "skill deleted");
        Ok(())
    }

    pub fn format_skill(skill: &skill::Model) -> FormattedSkill {
        FormattedSkill {
            slug: skill.slug.clone(),
            label: skill.label.clone(),
            icon_url: skill.icon_url.clone(),
            category: skill.category.clone(),
            created_at: skill.created_at,
            updated_at: skill.updated_at,
            deleted_at: skill.deleted_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify_special_characters() {
        assert_eq!(slugify("C#"), "c-sharp");
        assert_eq!(slugify("C++"), "c-plus-plus");
        assert_eq!(slugify("F#"), "f-sharp");
    }

    #[test]
    fn test_slugify_strict() {
        assert_eq!(slugify("Node.js"), "nodejs");
        assert_eq!(slugify("  Ruby   on Rails "), "ruby-on-rails");
        assert_eq!(slugify("TypeScript"), "typescript");
        assert_eq!(slugify("!!!"), "");
    }
}
