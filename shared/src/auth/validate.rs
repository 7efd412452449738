//! Field validators. Each returns the message shown to the client.

use taskboard_atoms::tasks::Subtask;

pub type Validation = Result<(), &'static str>;

pub fn username(value: &str) -> Validation {
    if value.is_empty() {
        return Err("Username cannot be empty.");
    }
    if value.len() < 5 {
        return Err("Username cannot be shorter than 5 characters.");
    }
    if value.len() > 15 {
        return Err("Username cannot be longer than 15 characters.");
    }
    if !value.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err("Username can contain only letters (a-z/A-Z) and digits (0-9).");
    }
    Ok(())
}

pub fn password(value: &str) -> Validation {
    if value.is_empty() {
        return Err("Password cannot be empty.");
    }
    if value.len() < 8 {
        return Err("Password cannot be shorter than 8 characters.");
    }
    if value.len() > 64 {
        return Err("Password cannot be longer than 64 characters.");
    }
    if !value.chars().any(|c| c.is_ascii_lowercase()) {
        return Err("Password must contain a lowercase letter (a-z).");
    }
    if !value.chars().any(|c| c.is_ascii_uppercase()) {
        return Err("Password must contain an uppercase letter (A-Z).");
    }
    if !value.chars().any(|c| c.is_ascii_digit()) {
        return Err("Password must contain a digit (0-9).");
    }
    if !value.chars().any(|c| c.is_ascii_punctuation()) {
        return Err("Password must contain a symbol.");
    }
    Ok(())
}

pub fn board_name(value: &str) -> Validation {
    if value.trim().is_empty() {
        return Err("Board name cannot be empty.");
    }
    if value.chars().count() > 35 {
        return Err("Board name cannot be longer than 35 characters.");
    }
    Ok(())
}

pub fn task_title(value: &str) -> Validation {
    if value.trim().is_empty() {
        return Err("Task title cannot be empty.");
    }
    if value.chars().count() > 50 {
        return Err("Task title cannot be longer than 50 characters.");
    }
    Ok(())
}

pub fn task_description(value: &str) -> Validation {
    if value.chars().count() > 500 {
        return Err("Task description cannot be longer than 500 characters.");
    }
    Ok(())
}

pub fn subtasks(values: &[Subtask]) -> Validation {
    for subtask in values {
        if subtask.title.trim().is_empty() {
            return Err("Subtask title cannot be empty.");
        }
        if subtask.title.chars().count() > 50 {
            return Err("Subtask title cannot be longer than 50 characters.");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usernames() {
        assert!(username("bob123").is_ok());
        assert!(username("").is_err());
        assert!(username("bob").is_err());
        assert!(username("bob_123").is_err());
        assert!(username("abcdefghijklmnop").is_err());
    }

    #[test]
    fn passwords() {
        assert!(password("Myp4ssword!").is_ok());
        assert_eq!(password("myp4ssword!"), Err("Password must contain an uppercase letter (A-Z)."));
        assert_eq!(password("Mypassword!"), Err("Password must contain a digit (0-9)."));
        assert_eq!(password("Myp4ssword"), Err("Password must contain a symbol."));
        assert!(password("Sh0rt!").is_err());
    }

    #[test]
    fn task_fields() {
        assert!(task_title("Ship it").is_ok());
        assert!(task_title("   ").is_err());
        assert!(task_title(&"x".repeat(51)).is_err());
        assert!(task_description("").is_ok());
        assert!(subtasks(&[Subtask { title: String::new(), is_done: false }]).is_err());
        assert!(board_name(&"b".repeat(36)).is_err());
    }
}
