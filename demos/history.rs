/// Example demonstrating the conversation history API
///
/// This example shows how to:
/// - List stored conversations
/// - Fetch one conversation's full transcript
use colloquy::{Relay, Role};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize the client
    let relay = Relay::new(None)?;

    // List stored conversations, newest first
    println!("Stored conversations:");
    let conversations = relay.list_conversations().await?;
    for summary in &conversations {
        println!(
            "- {} ({}) [{}]",
            summary.title, summary.created_at, summary.id
        );
    }

    // Fetch the most recent conversation's transcript
    if let Some(summary) = conversations.first() {
        println!("\nTranscript of: {}", summary.title);
        let conversation = relay.get_conversation(&summary.id).await?;
        for message in conversation.flatten() {
            let who = match message.role {
                Role::User => "you",
                Role::Bot => "bot",
            };
            println!("{}: {}", who, message.text);
        }
    }

    Ok(())
}
