//! Reply and inline keyboard builders

use teloxide::types::{ButtonRequest, InlineKeyboardButton, InlineKeyboardMarkup, KeyboardButton, KeyboardMarkup};

/// Video menu as a reply keyboard, two titles per row.
pub fn video_menu(titles: &[String]) -> KeyboardMarkup {
    let rows: Vec<Vec<KeyboardButton>> = titles
        .chunks(2)
        .map(|chunk| chunk.iter().map(|title| KeyboardButton::new(title.clone())).collect())
        .collect();
    KeyboardMarkup::new(rows).resize_keyboard()
}

/// One-button keyboard requesting the user's contact.
pub fn contact_request() -> KeyboardMarkup {
    KeyboardMarkup::new(vec![vec![
        KeyboardButton::new("Share phone number").request(ButtonRequest::Contact),
    ]])
    .resize_keyboard()
    .one_time_keyboard()
}

/// Admin panel menu labels.
pub fn admin_panel() -> KeyboardMarkup {
    KeyboardMarkup::new(vec![
        vec![KeyboardButton::new("Add Video"), KeyboardButton::new("View Users")],
        vec![KeyboardButton::new("Manage Videos")],
    ])
    .resize_keyboard()
    .one_time_keyboard()
}

/// Inline delete button attached to a user card in "View Users".
pub fn delete_user_button(telegram_id: i64) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![InlineKeyboardButton::callback(
        "❌ Delete",
        format!("delete_user_{}", telegram_id),
    )]])
}

/// Inline delete button attached to a video card in "Manage Videos".
pub fn delete_video_button(video_id: i64) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![InlineKeyboardButton::callback(
        "❌ Delete Video",
        format!("delete_video_{}", video_id),
    )]])
}

#[cfg(test)]
mod tests {
    use super::*;
    use teloxide::types::InlineKeyboardButtonKind;

    fn titles(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_video_menu_two_titles_per_row() {
        let menu = video_menu(&titles(&["One", "Two", "Three", "Four", "Five"]));
        let rows: Vec<usize> = menu.keyboard.iter().map(|row| row.len()).collect();
        assert_eq!(rows, vec![2, 2, 1]);
        assert_eq!(menu.keyboard[0][0].text, "One");
        assert_eq!(menu.keyboard[2][0].text, "Five");
    }

    #[test]
    fn test_video_menu_empty() {
        let menu = video_menu(&[]);
        assert!(menu.keyboard.is_empty());
    }

    #[test]
    fn test_contact_request_asks_for_contact() {
        let menu = contact_request();
        assert_eq!(menu.keyboard.len(), 1);
        let button = &menu.keyboard[0][0];
        assert_eq!(button.text, "Share phone number");
        assert_eq!(button.request, Some(ButtonRequest::Contact));
    }

    #[test]
    fn test_admin_panel_labels() {
        let menu = admin_panel();
        let labels: Vec<Vec<&str>> = menu
            .keyboard
            .iter()
            .map(|row| row.iter().map(|b| b.text.as_str()).collect())
            .collect();
        assert_eq!(labels, vec![vec!["Add Video", "View Users"], vec!["Manage Videos"]]);
    }

    #[test]
    fn test_delete_buttons_encode_ids() {
        let markup = delete_user_button(42);
        match &markup.inline_keyboard[0][0].kind {
            InlineKeyboardButtonKind::CallbackData(data) => assert_eq!(data, "delete_user_42"),
            other => panic!("unexpected button kind: {:?}", other),
        }

        let markup = delete_video_button(7);
        match &markup.inline_keyboard[0][0].kind {
            InlineKeyboardButtonKind::CallbackData(data) => assert_eq!(data, "delete_video_7"),
            other => panic!("unexpected button kind: {:?}", other),
        }
    }
}
