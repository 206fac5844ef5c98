// Console layer - a line-oriented front end over the resolution service.
//
// It plays the part of the gallery UI: it waits for the schema gate (done by
// `ResolutionService::open`) before choosing between the empty-state form and
// the gallery, and it owns the owner flag that gates deletion.

#[path = "commands.rs"]
pub mod commands;
#[path = "render.rs"]
pub mod render;

use crate::core::resolutions::{
    InitialView, LikeOutcome, ResolutionError, ResolutionService, SubmissionRequest,
};
use commands::Command;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};

/// How the next post is signed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Signature {
    pub anonymous: bool,
    pub name: Option<String>,
}

/// Text to print for one command, and whether the session ends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub quit: bool,
}

impl Reply {
    fn say(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            quit: false,
        }
    }
}

pub struct Console {
    service: Arc<ResolutionService>,
    owner: bool,
    signature: Signature,
}

impl Console {
    pub fn new(service: Arc<ResolutionService>, owner: bool) -> Self {
        Self {
            service,
            owner,
            signature: Signature::default(),
        }
    }

    /// First screen after start.
    pub async fn welcome(&self) -> String {
        match self.service.initial_view().await {
            InitialView::Form => render::form_intro().to_string(),
            InitialView::Gallery => self.gallery().await,
        }
    }

    pub async fn execute(&mut self, line: &str) -> Reply {
        if line.trim().is_empty() {
            return Reply::say("");
        }

        match commands::parse(line) {
            Ok(command) => self.run(command).await,
            Err(e) => Reply::say(e.to_string()),
        }
    }

    async fn run(&mut self, command: Command) -> Reply {
        match command {
            Command::Post(lines) => self.post(lines).await,
            Command::Sign(name) => {
                self.signature = Signature {
                    anonymous: name.is_none(),
                    name,
                };
                match &self.signature.name {
                    Some(name) => Reply::say(format!("New posts will be signed as {name}.")),
                    None => Reply::say("New posts will be anonymous."),
                }
            }
            Command::List => Reply::say(self.gallery().await),
            Command::Like(id) => self.like(&id).await,
            Command::Delete(id) => self.delete(&id).await,
            Command::Help => Reply::say(commands::HELP),
            Command::Quit => Reply {
                text: "Happy new year!".to_string(),
                quit: true,
            },
        }
    }

    async fn post(&self, lines: Vec<String>) -> Reply {
        let request = SubmissionRequest {
            resolution_lines: lines,
            anonymous: self.signature.anonymous,
            author_name: self.signature.name.clone(),
        };

        match self.service.submit(request).await {
            Ok(resolution) => Reply::say(format!(
                "Your resolutions have been shared!\n\n{}",
                render::card(&resolution, false)
            )),
            Err(e) => Reply::say(e.to_string()),
        }
    }

    async fn like(&self, id: &str) -> Reply {
        let id = match self.resolve_id(id).await {
            Ok(id) => id,
            Err(reply) => return reply,
        };

        match self.service.like(&id).await {
            Ok(LikeOutcome::Liked { likes }) => Reply::say(format!("♥ {likes}")),
            Ok(LikeOutcome::AlreadyLiked) => Reply::say("You already liked this one."),
            Err(e) => Reply::say(e.to_string()),
        }
    }

    async fn delete(&self, id: &str) -> Reply {
        if !self.owner {
            return Reply::say("Only the owner can delete resolutions.");
        }

        let id = match self.resolve_id(id).await {
            Ok(id) => id,
            Err(reply) => return reply,
        };

        match self.service.delete(&id).await {
            Ok(_) => Reply::say("Deleted."),
            Err(e) => Reply::say(e.to_string()),
        }
    }

    /// Accept a full id or a unique prefix of one.
    async fn resolve_id(&self, input: &str) -> Result<String, Reply> {
        let matches: Vec<String> = self
            .service
            .resolutions()
            .await
            .into_iter()
            .map(|r| r.id)
            .filter(|id| id.starts_with(input))
            .collect();

        match matches.as_slice() {
            [id] => Ok(id.clone()),
            [] => Err(Reply::say(
                ResolutionError::NotFound(input.to_string()).to_string(),
            )),
            _ => Err(Reply::say(format!(
                "'{input}' matches several resolutions; use more characters."
            ))),
        }
    }

    async fn gallery(&self) -> String {
        let mut cards = Vec::new();
        for resolution in self.service.resolutions().await {
            let liked = self.service.has_liked(&resolution.id).await;
            cards.push((resolution, liked));
        }
        render::gallery(&cards)
    }
}

/// Drive a console over stdin/stdout until `quit` or end of input.
pub async fn run_stdio(mut console: Console) -> anyhow::Result<()> {
    let mut stdout = tokio::io::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    print_block(&mut stdout, &console.welcome().await).await?;
    print_block(&mut stdout, "Type 'help' for commands.").await?;

    while let Some(line) = lines.next_line().await? {
        let reply = console.execute(&line).await;
        if !reply.text.is_empty() {
            print_block(&mut stdout, &reply.text).await?;
        }
        if reply.quit {
            break;
        }
    }

    Ok(())
}

async fn print_block(out: &mut (impl AsyncWrite + Unpin), text: &str) -> std::io::Result<()> {
    out.write_all(text.as_bytes()).await?;
    out.write_all(b"\n").await?;
    out.flush().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::moderation::WordFilter;
    use crate::infra::storage::InMemoryMedium;

    async fn console(owner: bool) -> Console {
        let service = ResolutionService::open(
            Arc::new(InMemoryMedium::new()),
            WordFilter::with_defaults().unwrap(),
        )
        .await;
        Console::new(Arc::new(service), owner)
    }

    async fn only_id(console: &Console) -> String {
        let all = console.service.resolutions().await;
        assert_eq!(all.len(), 1);
        all[0].id.clone()
    }

    #[tokio::test]
    async fn test_starts_on_form_then_gallery() {
        let mut console = console(false).await;
        assert!(console.welcome().await.contains("New Year's Resolutions"));

        console.execute("sign --anon").await;
        let reply = console.execute("post Learn to swim").await;
        assert!(reply.text.starts_with("Your resolutions have been shared!"));

        let welcome = console.welcome().await;
        assert!(welcome.contains("• Learn to swim"));
        assert!(welcome.contains("— Anonymous"));
        assert!(welcome.contains("♡ 0"));
    }

    #[tokio::test]
    async fn test_like_twice_by_prefix() {
        let mut console = console(false).await;
        console.execute("post Learn to swim").await;
        let id = only_id(&console).await;
        let prefix = &id[..6];

        assert_eq!(console.execute(&format!("like {prefix}")).await.text, "♥ 1");
        assert_eq!(
            console.execute(&format!("like {prefix}")).await.text,
            "You already liked this one."
        );
        assert!(console.execute("list").await.text.contains("♥ 1"));
    }

    #[tokio::test]
    async fn test_delete_requires_owner() {
        let mut visitor = console(false).await;
        visitor.execute("post Learn to swim").await;
        let id = only_id(&visitor).await;

        let reply = visitor.execute(&format!("delete {id}")).await;

        assert_eq!(reply.text, "Only the owner can delete resolutions.");
        assert_eq!(visitor.service.resolutions().await.len(), 1);
    }

    #[tokio::test]
    async fn test_owner_can_delete() {
        let mut owner = console(true).await;
        owner.execute("post Learn to swim").await;
        let id = only_id(&owner).await;

        assert_eq!(owner.execute(&format!("delete {id}")).await.text, "Deleted.");
        assert!(owner.execute("list").await.text.starts_with("No resolutions yet"));
    }

    #[tokio::test]
    async fn test_signed_post_and_generic_rejection() {
        let mut console = console(false).await;
        console.execute("sign Dana").await;

        let accepted = console.execute("post Run a marathon").await;
        assert!(accepted.text.contains("— Dana"));

        let rejected = console.execute("post Stop giving a d4mn").await;
        assert_eq!(
            rejected.text,
            "Please keep your resolutions positive and appropriate for everyone"
        );
        assert_eq!(console.service.resolutions().await.len(), 1);
    }

    #[tokio::test]
    async fn test_empty_post_is_rejected() {
        let mut console = console(false).await;

        let reply = console.execute("post  |  ").await;

        assert_eq!(reply.text, "Please enter at least one resolution");
    }

    #[tokio::test]
    async fn test_quit() {
        let mut console = console(false).await;

        assert!(console.execute("quit").await.quit);
        assert!(!console.execute("help").await.quit);
    }
}
