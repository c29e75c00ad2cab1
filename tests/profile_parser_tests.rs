use charsheet::profile_parser::*;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_profile_block() {
        let patch = parse_profile_text("Имя: Лира\nВозраст: 23\nИнвентарь: Лук, зелье");

        assert_eq!(patch.name.as_deref(), Some("Лира"));
        assert_eq!(patch.age.as_deref(), Some("23"));
        assert_eq!(patch.inventory, Some(vec!["Лук".to_string(), "зелье".to_string()]));
        assert_eq!(patch.role, None);
        assert_eq!(patch.stats, None);
        assert_eq!(patch.experience, None);
    }

    #[test]
    fn test_full_block_after_command() {
        let text = "/setprofile\n\
                    Name: Lyra\n\
                    Класс: Следопыт\n\
                    Статы: Сила 10, Ловкость=14; Мудрость: 12\n\
                    Опыт: 120 очков\n\
                    Биография: Выросла в лесу.\n\
                    Ушла из дома в шестнадцать.";
        let patch = parse_profile_text(text);

        assert_eq!(patch.name.as_deref(), Some("Lyra"));
        assert_eq!(patch.role.as_deref(), Some("Следопыт"));
        assert_eq!(patch.experience, Some(120));
        assert_eq!(
            patch.biography.as_deref(),
            Some("Выросла в лесу.\nУшла из дома в шестнадцать.")
        );

        let stats = patch.stats.unwrap();
        assert_eq!(stats.get("Сила"), Some(&10));
        assert_eq!(stats.get("Ловкость"), Some(&14));
        assert_eq!(stats.get("Мудрость"), Some(&12));
    }

    #[test]
    fn test_command_and_field_on_one_line() {
        let patch = parse_profile_text("/заполнить Имя: Лира");
        assert_eq!(patch.name.as_deref(), Some("Лира"));
    }

    #[test]
    fn test_no_labels_gives_empty_patch() {
        assert!(parse_profile_text("/setprofile").is_empty());
        assert!(parse_profile_text("/setprofile просто текст без полей").is_empty());
        assert!(parse_profile_text("Оружие: меч").is_empty());
    }

    #[test]
    fn test_unknown_label_continues_previous_field() {
        let patch = parse_profile_text("Биография: Начало\nГлава: вторая");
        assert_eq!(patch.biography.as_deref(), Some("Начало\nГлава: вторая"));
    }

    #[test]
    fn test_empty_scalar_is_left_unset() {
        let patch = parse_profile_text("Имя:\nРоль: Бард");
        assert_eq!(patch.name, None);
        assert_eq!(patch.role.as_deref(), Some("Бард"));
    }

    #[test]
    fn test_inventory_separators() {
        assert_eq!(
            parse_inventory("Лук; стрелы и зелье, верёвка and torch"),
            vec!["Лук", "стрелы", "зелье", "верёвка", "torch"]
        );
        assert_eq!(parse_inventory("Иней"), vec!["Иней"]);
        assert!(parse_inventory(" , ;").is_empty());
    }

    #[test]
    fn test_inventory_label_with_nothing_parsed_clears_list() {
        let patch = parse_profile_text("Инвентарь:");
        assert_eq!(patch.inventory, Some(Vec::new()));
    }

    #[test]
    fn test_malformed_stats_are_dropped() {
        let stats = parse_stats("Сила 10, Удача много, 15, Харизма: -2");
        assert_eq!(stats.len(), 2);
        assert_eq!(stats.get("Сила"), Some(&10));
        assert_eq!(stats.get("Харизма"), Some(&-2));
    }

    #[test]
    fn test_stats_keep_entry_order() {
        let stats = parse_stats("Сила 10, Ловкость 14, Интеллект 8, Выносливость 12");
        let names: Vec<&str> = stats.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["Сила", "Ловкость", "Интеллект", "Выносливость"]);
    }

    #[test]
    fn test_experience_without_number_is_zero() {
        let patch = parse_profile_text("Опыт: никакого");
        assert_eq!(patch.experience, Some(0));
    }

    #[test]
    fn test_labels_are_case_insensitive() {
        let patch = parse_profile_text("ИМЯ: Лира\nage: 23");
        assert_eq!(patch.name.as_deref(), Some("Лира"));
        assert_eq!(patch.age.as_deref(), Some("23"));
    }
}
