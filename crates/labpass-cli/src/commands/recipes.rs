use clap::ValueEnum;
use colored::Colorize;
use labpass_core::Recipe;

use crate::cli::RecipeArg;

pub fn list() {
    for arg in RecipeArg::value_variants() {
        let Some(name) = arg.to_possible_value() else {
            continue;
        };
        let recipe = Recipe::from(*arg);
        println!(
            "{:<36} {} ({})",
            name.get_name().cyan(),
            recipe,
            recipe.output_dir_name()
        );
    }
}
