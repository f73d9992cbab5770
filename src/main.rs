mod ai_connector;
mod review_table;
mod sentiment_analyzer;
mod sentiment_chart;
mod settings;
mod user_experience;
mod user_interaction;

use crate::ai_connector::OpenAiClient;
use crate::review_table::{load_reviews_dataset, ReviewTable, ALL_PRODUCTS, PRODUCT_COLUMN, SENTIMENT_COLUMN};
use crate::sentiment_analyzer::analyze_reviews;
use crate::sentiment_chart::show_breakdown;
use crate::settings::{open_settings, resolve_open_ai_access};
use crate::user_experience::{handle_cancel_flag, handle_quit_flag, handle_special_flag};
use crate::user_interaction::{
    determine_action_as_text, get_user_input, get_user_input_level_2, print_insight,
    print_insight_level_2, print_list, print_list_level_2,
};

const BRO_VERSION: &str = "0.3.1";

#[tokio::main]
async fn main() {
    if std::env::args().any(|arg| arg == "--version") {
        print_insight(BRO_VERSION);
        std::process::exit(0);
    }

    println!(
        r#"

   _____ ______ _   _ _______ _____   ____  _____    ____
  / ____|  ____| \ | |__   __|_   _| |  _ \|  __ \  / __ \
 | (___ | |__  |  \| |  | |    | |   | |_) | |__) || |  | |
  \___ \|  __| | . ` |  | |    | |   |  _ <|  _  / | |  | |
  ____) | |____| |\  |  | |   _| |_  | |_) | | \ \ | |__| |
 |_____/|______|_| \_|  |_|  |_____| |____/|_|  \_\ \____/

         GenAI sentiment analysis for your review csvs

"#
    );

    let menu_options = vec![
        "LOAD DATASET",
        "ANALYZE SENTIMENT",
        "VIEW DASHBOARD",
        "SETTINGS",
    ];

    // One dashboard session; replaced only when a load succeeds
    let mut session: Option<ReviewTable> = None;

    loop {
        print_list(&menu_options);
        let choice = get_user_input("Your move, bro: ").to_lowercase();

        let _ = handle_quit_flag(&choice);
        if handle_special_flag(&choice) {
            continue;
        }

        let selected_option = determine_action_as_text(&menu_options, &choice);

        match selected_option {
            Some(ref action) if action == "LOAD DATASET" => match load_reviews_dataset() {
                Ok(table) => {
                    print_insight("Dataset loaded successfully!");
                    if table.has_data() {
                        table.print_table();
                        println!();
                    }
                    session = Some(table);
                }
                Err(e) => {
                    print_insight(&format!("{}", e));
                }
            },
            Some(ref action) if action == "ANALYZE SENTIMENT" => match session.as_mut() {
                Some(table) => {
                    analyze_session(table).await;
                }
                None => {
                    print_insight("Please load the dataset first, bro.");
                }
            },
            Some(ref action) if action == "VIEW DASHBOARD" => match session.as_ref() {
                Some(table) => {
                    view_dashboard(table);
                }
                None => {
                    print_insight("Please load the dataset first, bro.");
                }
            },
            Some(ref action) if action == "SETTINGS" => {
                let _ = open_settings();
            }
            _ => {
                print_insight("Dude, that action's a no-go. Give it another whirl, alright?");
            }
        }
    }
}

async fn analyze_session(table: &mut ReviewTable) {
    let (api_key, model) = match resolve_open_ai_access() {
        Ok(access) => access,
        Err(e) => {
            print_insight(&format!("{}", e));
            return;
        }
    };

    let client = OpenAiClient::new(api_key, model);
    print_insight_level_2(&format!(
        "Analyzing sentiment with {} ... hang tight.",
        client.model()
    ));

    match analyze_reviews(table, &client).await {
        Ok(labelled) => {
            print_insight(&format!(
                "Sentiment analysis completed! {} row(s) labelled.",
                labelled
            ));
            if table.has_data() {
                table.print_table();
                println!();
            }
        }
        Err(e) => {
            print_insight(&format!("Something went wrong: {}", e));
        }
    }
}

fn view_dashboard(table: &ReviewTable) {
    let products = table.unique_values(PRODUCT_COLUMN);

    let mut product_options: Vec<&str> = vec![ALL_PRODUCTS];
    product_options.extend(products.iter().map(AsRef::<str>::as_ref));

    print_insight_level_2("Choose a product:");
    print_list_level_2(&product_options);

    let choice = get_user_input_level_2("Enter your choice: ");
    if handle_cancel_flag(&choice) {
        return;
    }
    let _ = handle_quit_flag(&choice);

    let product = match determine_action_as_text(&product_options, &choice) {
        Some(product) => product,
        None => {
            print_insight_level_2("No such product. Back to the menu.");
            return;
        }
    };

    println!();
    print_insight_level_2(&format!("Reviews for {}", product));
    let filtered = table.filtered_for_product(&product);
    filtered.print_table();
    println!();

    if table.column_index(SENTIMENT_COLUMN).is_some() {
        show_breakdown(&filtered, &product);
    } else {
        print_insight_level_2("Tip: run ANALYZE SENTIMENT to unlock the breakdown chart.");
    }
}
