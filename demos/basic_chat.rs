use colloquy::{ChatRequest, Relay, Result};

#[tokio::main]
async fn main() -> Result<()> {
    // Create a client using COLLOQUY_RELAY_URL or the localhost default
    let relay = Relay::new(None)?;

    // Send a first message; the relay mints a conversation for it
    let request = ChatRequest::new("Hello! What can you do?", "gpt-3.5-turbo");
    let reply = relay.chat(request).await?;
    println!("Bot: {}", reply.response);

    // Continue in the same conversation
    if let Some(id) = reply.conversation_id {
        let request = ChatRequest::new("Thanks! Summarize that in one sentence.", "gpt-3.5-turbo")
            .with_conversation(id.clone());
        let reply = relay.chat(request).await?;
        println!("Bot: {}", reply.response);

        println!("\nConversation stored as {id}");
    }

    Ok(())
}
