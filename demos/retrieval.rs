//! Knowledge retrieval end to end: upload a document, attach it to an
//! assistant with the retrieval tool enabled and ask a question only the
//! document can answer.
//!
//! Needs `OPENAI_API_KEY` in the environment or a `.env` file.

use openai_assistants::assistants::messages::{MessageRequest, Role};
use openai_assistants::assistants::runs::RunRequest;
use openai_assistants::assistants::threads::ThreadRequest;
use openai_assistants::assistants::{AssistantRequest, RunDriver, Tool};
use openai_assistants::files::{FileUpload, Purpose};
use openai_assistants::{Client, Credentials, ListQuery};

const HANDBOOK: &str = "\
Acme Corp expense policy, revision 7.
Meals while travelling are reimbursed up to 45 euro per day.
Taxi rides require a receipt; rides above 80 euro also require
prior written approval from a team lead.
";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let client = Client::new(Credentials::from_env()?)?;

    let file = client
        .upload_file(&FileUpload::new(
            "expense-policy.txt",
            HANDBOOK.as_bytes().to_vec(),
            Purpose::Assistants,
        ))
        .await?;
    println!("uploaded: {} ({} bytes)", file.id, file.bytes);

    let assistant = client
        .create_assistant(
            &AssistantRequest::builder("gpt-4-1106-preview")
                .name("Policy assistant")
                .instructions(
                    "Answer questions using the attached company documents. \
                     Cite the relevant rule.",
                )
                .tools(vec![Tool::Retrieval])
                .build()?,
        )
        .await?;
    let attached = client.attach_assistant_file(&assistant.id, &file.id).await?;
    println!("attached {} to {}", attached.id, attached.assistant_id);

    let thread = client.create_thread(&ThreadRequest::default()).await?;
    client
        .create_message(
            &thread.id,
            &MessageRequest::new(
                Role::User,
                "I took a 95 euro taxi ride. What do I need for reimbursement?",
            ),
        )
        .await?;

    let driver = RunDriver::new(&client);
    let run = driver
        .run(&thread.id, &RunRequest::new(&assistant.id))
        .await?;
    println!("run {} finished with status {:?}", run.id, run.status);

    let messages = client.list_messages(&thread.id, &ListQuery::default()).await?;
    for message in messages.data.iter().filter(|m| m.role == Role::Assistant) {
        println!("assistant says: {}", message.text());
    }

    client.delete_assistant_file(&assistant.id, &file.id).await?;
    client.delete_thread(&thread.id).await?;
    client.delete_assistant(&assistant.id).await?;
    client.delete_file(&file.id).await?;
    Ok(())
}
