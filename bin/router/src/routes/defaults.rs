use crate::permissions::Permission::{CreatePost, EditPost, ViewComments, ViewPosts};
use crate::routes::table::{RouteDescriptor, RouteName, RouteTable, RouteTableError};

/// The routes of the posts application, in declaration order.
pub fn default_routes() -> Vec<RouteDescriptor> {
    vec![
        RouteDescriptor::public(RouteName::Login, "/login", "LoginPage")
            .bundles(["auth"])
            .eager(),
        RouteDescriptor::public(RouteName::Forbidden, "/403", "ForbiddenPage").bundles(["errors"]),
        RouteDescriptor::public(RouteName::NotFound, "/404", "NotFoundPage").bundles(["errors"]),
        RouteDescriptor::authenticated(RouteName::Dashboard, "/", "DashboardPage")
            .requires([ViewPosts, ViewComments])
            .bundles(["dashboard", "posts", "comments"]),
        RouteDescriptor::authenticated(RouteName::Posts, "/posts", "PostsPage")
            .requires([ViewPosts])
            .bundles(["posts"]),
        RouteDescriptor::authenticated(RouteName::Post, "/posts/:id", "PostPage")
            .requires([ViewPosts])
            .bundles(["posts", "comments"]),
        RouteDescriptor::authenticated(RouteName::PostEdit, "/posts/:id/edit", "PostEditPage")
            .requires([ViewPosts, EditPost])
            .bundles(["posts"]),
        RouteDescriptor::authenticated(
            RouteName::PostComments,
            "/posts/:id/comments",
            "PostCommentsPage",
        )
        .requires([ViewPosts, ViewComments])
        .bundles(["posts", "comments"]),
        RouteDescriptor::authenticated(RouteName::CreatePost, "/posts/create", "CreatePostPage")
            .requires([CreatePost])
            .bundles(["posts"]),
    ]
}

pub fn default_route_table() -> Result<RouteTable, RouteTableError> {
    RouteTable::new(default_routes())
}

#[cfg(test)]
mod tests {
    use super::default_route_table;

    #[test]
    fn default_table_layout() {
        let table = default_route_table().expect("default routes are valid");
        let rendered = table
            .routes()
            .map(|route| {
                format!(
                    "{:<13} {:<20} {:<13} [{}] ({})",
                    route.name.as_ref(),
                    route.path_template,
                    format!("{:?}", route.access),
                    route.required_permissions,
                    route.required_bundles.join(", ")
                )
            })
            .collect::<Vec<_>>()
            .join("\n");

        insta::assert_snapshot!(rendered, @r"
        login         /login               Public        [-] (auth)
        forbidden     /403                 Public        [-] (errors)
        notFound      /404                 Public        [-] (errors)
        dashboard     /                    Authenticated [VIEW_POSTS, VIEW_COMMENTS] (dashboard, posts, comments)
        posts         /posts               Authenticated [VIEW_POSTS] (posts)
        post          /posts/:id           Authenticated [VIEW_POSTS] (posts, comments)
        postEdit      /posts/:id/edit      Authenticated [VIEW_POSTS, EDIT_POST] (posts)
        postComments  /posts/:id/comments  Authenticated [VIEW_POSTS, VIEW_COMMENTS] (posts, comments)
        createPost    /posts/create        Authenticated [CREATE_POST] (posts)
        ");
    }
}
