use crate::types::{UserProfile, UserProfileWithStats};

use super::{
    MarkdownContent, TimezoneOffset, bookmark_markdown_with_timezone,
    format_date_with_timezone_offset,
};

pub fn user_profile_markdown_with_timezone(
    profile: &UserProfile,
    timezone: Option<&TimezoneOffset>,
) -> MarkdownContent {
    let mut content = String::new();

    content.push_str(&format!("# {}\n", profile.display_name));
    content.push_str(&format!("id: {}\n", profile.id));
    if let Some(photo_url) = &profile.photo_url {
        content.push_str(&format!("photo: {}\n", photo_url));
    }
    content.push_str(&format!(
        "joined: {}\n",
        format_date_with_timezone_offset(profile.created_at, timezone)
    ));
    if !profile.interests.is_empty() {
        content.push_str(&format!("interests: {}\n", profile.interests.join(", ")));
    }
    if let Some(bio) = &profile.bio {
        content.push_str(&format!("\n{}\n", bio));
    }

    MarkdownContent(content)
}

pub fn user_profile_with_stats_markdown_with_timezone(
    stats: &UserProfileWithStats,
    timezone: Option<&TimezoneOffset>,
) -> MarkdownContent {
    let mut content = user_profile_markdown_with_timezone(&stats.profile, timezone).0;

    content.push_str(&format!("\n## Bookmarks: {}\n", stats.total_bookmarks));

    if !stats.top_languages.is_empty() {
        let languages: Vec<String> = stats
            .top_languages
            .iter()
            .map(|l| format!("{} ({})", l.language, l.count))
            .collect();
        content.push_str(&format!("top languages: {}\n", languages.join(", ")));
    }

    if !stats.recent_bookmarks.is_empty() {
        content.push_str("\n## Recent\n");
        for bookmark in &stats.recent_bookmarks {
            content.push_str(&bookmark_markdown_with_timezone(bookmark, timezone).0);
        }
    }

    MarkdownContent(content)
}
