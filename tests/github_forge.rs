//! Integration tests for the GitHub REST forge.
//!
//! Each test stands up a `wiremock` server in place of api.github.com and
//! checks the request shape and the mapping of responses to `ForgeError`.

use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use guild_publish::core::types::{BranchName, Credential, RepoName};
use guild_publish::forge::github::GitHubForge;
use guild_publish::forge::{
    CreateRepoRequest, FileCommit, Forge, ForgeError, PagesSource, RepoRef,
};

const TOKEN: &str = "ghp_test_token";
const REPO_PATH: &str = "/repos/octocat/The-Tulsa-Software-Guild";

fn forge(server: &MockServer) -> GitHubForge {
    GitHubForge::with_api_base(Credential::new(TOKEN).unwrap(), server.uri())
}

fn repo() -> RepoRef {
    RepoRef::new("octocat", RepoName::new("The-Tulsa-Software-Guild").unwrap())
}

fn main_branch() -> BranchName {
    BranchName::new("main").unwrap()
}

fn repo_json() -> serde_json::Value {
    json!({
        "name": "The-Tulsa-Software-Guild",
        "html_url": "https://github.com/octocat/The-Tulsa-Software-Guild",
        "default_branch": "main",
        "owner": { "login": "octocat" }
    })
}

// =============================================================================
// Request shape
// =============================================================================

mod requests {
    use super::*;

    #[tokio::test]
    async fn sends_auth_and_version_headers() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/user"))
            .and(header("authorization", "Bearer ghp_test_token"))
            .and(header("accept", "application/vnd.github+json"))
            .and(header("x-github-api-version", "2022-11-28"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "login": "octocat" })))
            .expect(1)
            .mount(&server)
            .await;

        let login = forge(&server).authenticated_user().await.unwrap();
        assert_eq!(login, "octocat");
    }

    #[tokio::test]
    async fn create_repo_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/user/repos"))
            .and(body_json(json!({
                "name": "The-Tulsa-Software-Guild",
                "description": "GitHub Pages site for Tulsa Software Guild",
                "private": false,
                "has_issues": false,
                "has_projects": false,
                "has_wiki": false,
                "auto_init": true
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(repo_json()))
            .expect(1)
            .mount(&server)
            .await;

        let created = forge(&server)
            .create_repo(CreateRepoRequest {
                name: RepoName::new("The-Tulsa-Software-Guild").unwrap(),
                description: "GitHub Pages site for Tulsa Software Guild".to_string(),
                private: false,
                has_issues: false,
                has_projects: false,
                has_wiki: false,
                auto_init: true,
            })
            .await
            .unwrap();

        assert_eq!(created.owner, "octocat");
        assert_eq!(created.default_branch, "main");
    }

    #[tokio::test]
    async fn create_branch_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(format!("{}/git/refs", REPO_PATH)))
            .and(body_json(json!({ "ref": "refs/heads/main", "sha": "abc123" })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({})))
            .expect(1)
            .mount(&server)
            .await;

        forge(&server)
            .create_branch(&repo(), &main_branch(), "abc123")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn create_file_encodes_content_without_sha() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path(format!("{}/contents/index.html", REPO_PATH)))
            .and(body_json(json!({
                "message": "Initial site deployment for Tulsa",
                "content": "PGgxPlR1bHNhPC9oMT4=",
                "branch": "main"
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({})))
            .expect(1)
            .mount(&server)
            .await;

        forge(&server)
            .create_file(
                &repo(),
                FileCommit {
                    path: "index.html".to_string(),
                    message: "Initial site deployment for Tulsa".to_string(),
                    content: "<h1>Tulsa</h1>".to_string(),
                    branch: main_branch(),
                },
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn update_file_sends_sha() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path(format!("{}/contents/.nojekyll", REPO_PATH)))
            .and(body_json(json!({
                "message": "Add .nojekyll to enable direct HTML serving",
                "content": "",
                "branch": "main",
                "sha": "blob123"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(1)
            .mount(&server)
            .await;

        forge(&server)
            .update_file(
                &repo(),
                FileCommit {
                    path: ".nojekyll".to_string(),
                    message: "Add .nojekyll to enable direct HTML serving".to_string(),
                    content: String::new(),
                    branch: main_branch(),
                },
                "blob123",
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn pages_body() {
        let server = MockServer::start().await;
        let body = json!({ "source": { "branch": "main", "path": "/" } });
        Mock::given(method("POST"))
            .and(path(format!("{}/pages", REPO_PATH)))
            .and(body_json(body.clone()))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "html_url": "https://octocat.github.io/The-Tulsa-Software-Guild/",
                "status": null,
                "source": { "branch": "main", "path": "/" }
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path(format!("{}/pages", REPO_PATH)))
            .and(body_json(body))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let forge = forge(&server);
        let source = PagesSource::root(&main_branch());
        let site = forge.create_pages(&repo(), &source).await.unwrap();
        assert_eq!(site.source, Some(source.clone()));
        assert_eq!(site.status, None);

        forge.update_pages(&repo(), &source).await.unwrap();
    }
}

// =============================================================================
// Lookups
// =============================================================================

mod lookups {
    use super::*;

    #[tokio::test]
    async fn missing_repo_is_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(REPO_PATH))
            .respond_with(
                ResponseTemplate::new(404).set_body_json(json!({ "message": "Not Found" })),
            )
            .mount(&server)
            .await;

        assert!(forge(&server).get_repo(&repo()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn existing_repo() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(REPO_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(repo_json()))
            .mount(&server)
            .await;

        let found = forge(&server).get_repo(&repo()).await.unwrap().unwrap();
        assert_eq!(
            found.html_url,
            "https://github.com/octocat/The-Tulsa-Software-Guild"
        );
    }

    #[tokio::test]
    async fn branch_lookup() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("{}/branches/main", REPO_PATH)))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "name": "main",
                "commit": { "sha": "abc123" }
            })))
            .mount(&server)
            .await;

        let branch = forge(&server)
            .get_branch(&repo(), &main_branch())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(branch.commit_sha, "abc123");
    }

    #[tokio::test]
    async fn latest_commit_of_empty_repo() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("{}/commits", REPO_PATH)))
            .and(query_param("per_page", "1"))
            .respond_with(
                ResponseTemplate::new(409)
                    .set_body_json(json!({ "message": "Git Repository is empty." })),
            )
            .mount(&server)
            .await;

        assert!(forge(&server).latest_commit(&repo()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn latest_commit_of_missing_repo_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("{}/commits", REPO_PATH)))
            .respond_with(
                ResponseTemplate::new(404).set_body_json(json!({ "message": "Not Found" })),
            )
            .mount(&server)
            .await;

        let err = forge(&server).latest_commit(&repo()).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn latest_commit_sha() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("{}/commits", REPO_PATH)))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!([{ "sha": "head456" }])),
            )
            .mount(&server)
            .await;

        assert_eq!(
            forge(&server).latest_commit(&repo()).await.unwrap(),
            Some("head456".to_string())
        );
    }

    #[tokio::test]
    async fn file_is_fetched_from_branch_and_decoded() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("{}/contents/index.html", REPO_PATH)))
            .and(query_param("ref", "main"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "path": "index.html",
                "sha": "blob789",
                "encoding": "base64",
                "content": "PGgxPlR1\nbHNhPC9oMT4=\n"
            })))
            .mount(&server)
            .await;

        let file = forge(&server)
            .get_file(&repo(), "index.html", &main_branch())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(file.sha, "blob789");
        assert_eq!(file.content, b"<h1>Tulsa</h1>");
    }

    #[tokio::test]
    async fn missing_pages_is_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("{}/pages", REPO_PATH)))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        assert!(forge(&server).get_pages(&repo()).await.unwrap().is_none());
    }
}

// =============================================================================
// Error mapping
// =============================================================================

mod errors {
    use super::*;

    async fn user_error(response: ResponseTemplate) -> ForgeError {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/user"))
            .respond_with(response)
            .mount(&server)
            .await;
        forge(&server).authenticated_user().await.unwrap_err()
    }

    #[tokio::test]
    async fn unauthorized() {
        let err = user_error(ResponseTemplate::new(401)).await;
        assert!(matches!(err, ForgeError::AuthFailed(_)));
        assert!(!err.to_string().contains(TOKEN));
    }

    #[tokio::test]
    async fn forbidden_names_required_permission() {
        let err = user_error(
            ResponseTemplate::new(403)
                .insert_header("X-Accepted-GitHub-Permissions", "pages=write")
                .set_body_json(json!({ "message": "Resource not accessible by integration" })),
        )
        .await;
        match err {
            ForgeError::AuthFailed(message) => assert!(message.contains("pages=write")),
            other => panic!("expected AuthFailed, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn exhausted_rate_limit() {
        let err = user_error(
            ResponseTemplate::new(403)
                .insert_header("X-RateLimit-Remaining", "0")
                .set_body_json(json!({ "message": "API rate limit exceeded" })),
        )
        .await;
        assert_eq!(err, ForgeError::RateLimited);
    }

    #[tokio::test]
    async fn too_many_requests() {
        let err = user_error(ResponseTemplate::new(429)).await;
        assert_eq!(err, ForgeError::RateLimited);
    }

    #[tokio::test]
    async fn server_error_is_not_absence() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(REPO_PATH))
            .respond_with(ResponseTemplate::new(502).set_body_json(json!({ "message": "Bad Gateway" })))
            .mount(&server)
            .await;

        let err = forge(&server).get_repo(&repo()).await.unwrap_err();
        match err {
            ForgeError::ApiError { status, message } => {
                assert_eq!(status, 502);
                assert!(message.starts_with("GitHub server error"));
            }
            other => panic!("expected ApiError, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn pages_conflict() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(format!("{}/pages", REPO_PATH)))
            .respond_with(
                ResponseTemplate::new(409)
                    .set_body_json(json!({ "message": "GitHub Pages is already enabled." })),
            )
            .mount(&server)
            .await;

        let err = forge(&server)
            .create_pages(&repo(), &PagesSource::root(&main_branch()))
            .await
            .unwrap_err();
        assert!(err.is_conflict());
    }

    #[tokio::test]
    async fn validation_failure_keeps_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/user/repos"))
            .respond_with(
                ResponseTemplate::new(422)
                    .set_body_json(json!({ "message": "Repository creation failed." })),
            )
            .mount(&server)
            .await;

        let err = forge(&server)
            .create_repo(CreateRepoRequest {
                name: RepoName::new("The-Tulsa-Software-Guild").unwrap(),
                description: String::new(),
                private: false,
                has_issues: false,
                has_projects: false,
                has_wiki: false,
                auto_init: true,
            })
            .await
            .unwrap_err();
        assert_eq!(
            err,
            ForgeError::ApiError {
                status: 422,
                message: "Repository creation failed.".to_string()
            }
        );
    }

    #[tokio::test]
    async fn unreachable_server_is_network_error() {
        let forge = GitHubForge::with_api_base(Credential::new(TOKEN).unwrap(), "http://127.0.0.1:9");
        let err = forge.authenticated_user().await.unwrap_err();
        assert!(matches!(err, ForgeError::NetworkError(_)));
    }
}
