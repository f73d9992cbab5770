// src/user_experience.rs
use crate::settings::open_settings;
use crate::user_interaction::{print_insight, print_list};

/// Handles flags that work from any menu. Returns true if the flag was
/// consumed, so the caller can skip its own option matching.
pub fn handle_special_flag(flag: &str) -> bool {
    match flag {
        "@f" | "@flags" => {
            let flags = vec![
                "@b           : Secondary menu => Back to the previous menu",
                "@c           : After action select/ in vim edit => Cancel action",
                "@f / @flags  : Primary/ Secondary menu => View all flags",
                "@settings    : Primary menu => Manage OpenAI presets",
                "@q           : Anywhere => Quit sentibro",
            ];

            print_insight("Serving your flags ...");
            print_list(&flags);
            println!();
            true
        }
        "@settings" => {
            let _ = open_settings();
            true
        }
        _ => false,
    }
}

pub fn handle_back_flag(flag: &str) -> bool {
    matches!(flag, "@b")
}

pub fn handle_quit_flag(flag: &str) {
    if flag == "@q" {
        std::process::exit(0);
    }
}

pub fn handle_cancel_flag(flag: &str) -> bool {
    let trimmed = flag.trim();
    match trimmed {
        f if f == "@c" => true,
        f if f.starts_with("@c") => true,
        _ => false,
    }
}
