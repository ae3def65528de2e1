mod geo_steps;
mod run_steps;
mod scoring_steps;
mod verifier_steps;
