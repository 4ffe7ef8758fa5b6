use rand::seq::SliceRandom;

/// Built-in read-aloud sentences for drills started without an explicit
/// prompt. Plain everyday English, varied in length.
pub const PROMPTS: &[&str] = &[
    "The weather is lovely today",
    "Could you tell me the way to the station",
    "She sells sea shells on the sea shore",
    "I would like a cup of coffee please",
    "Practice makes perfect",
    "The early bird catches the worm",
    "How much does this ticket cost",
    "My favorite season is autumn because of the colors",
    "Please speak a little more slowly",
    "Reading every day improves your vocabulary",
    "The quick brown fox jumps over the lazy dog",
    "Thank you very much for your help",
];

/// Pick a random built-in prompt.
pub fn random_prompt() -> &'static str {
    let mut rng = rand::thread_rng();
    PROMPTS
        .choose(&mut rng)
        .copied()
        .unwrap_or("Practice makes perfect")
}
