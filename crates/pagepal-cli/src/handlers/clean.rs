use pagepal_voice::clean_for_speech;

/// Print `text` the way it would be sent to the speech provider.
pub fn execute(text: &str) {
    println!("{}", clean_for_speech(text));
}
