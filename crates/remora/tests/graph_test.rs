use remora::{Error, Point, Rect, VertexId, VisibilityGraph};

fn p(x: i32, y: i32) -> Point {
    Point::new(x, y)
}

fn vertex_at(g: &VisibilityGraph, point: Point) -> VertexId {
    g.vertices()
        .find(|(_, v)| v.position() == point)
        .map(|(id, _)| id)
        .unwrap_or_else(|| panic!("no vertex at {point:?}"))
}

fn linked(g: &VisibilityGraph, a: Point, b: Point) -> bool {
    let va = vertex_at(g, a);
    let vb = vertex_at(g, b);
    let forward = g.vertex(va).is_some_and(|v| v.neighbors().contains(&vb));
    let backward = g.vertex(vb).is_some_and(|v| v.neighbors().contains(&va));
    assert_eq!(forward, backward, "adjacency must be symmetric");
    forward
}

#[test]
fn registering_rejects_a_rectangle_without_area() {
    let mut g = VisibilityGraph::new(4);
    assert_eq!(
        g.register_obstacle(Rect::new(0, 0, 0, 10)),
        Err(Error::DegenerateObstacle {
            width: 0,
            height: 10
        })
    );
    assert_eq!(
        g.register_obstacle(Rect::new(0, 0, 10, -5)),
        Err(Error::DegenerateObstacle {
            width: 10,
            height: -5
        })
    );
    assert_eq!(g.vertex_count(), 0);
}

#[test]
fn an_obstacle_contributes_four_expanded_corner_vertices() {
    let mut g = VisibilityGraph::new(4);
    assert_eq!(g.clearance(), 4);
    let id = g.register_obstacle(Rect::new(0, 0, 10, 10)).unwrap();
    assert_eq!(g.vertex_count(), 4);

    let ob = g.obstacle(id).unwrap();
    assert_eq!(ob.bounds(), Rect::new(0, 0, 10, 10));
    assert_eq!(ob.expanded(), Rect::new(-4, -4, 18, 18));
    let corner_positions: Vec<Point> = ob
        .corners()
        .iter()
        .map(|&c| g.vertex(c).unwrap().position())
        .collect();
    assert_eq!(
        corner_positions,
        vec![p(-4, -4), p(14, -4), p(14, 14), p(-4, 14)]
    );

    let mut positions: Vec<Point> = g.vertices().map(|(_, v)| v.position()).collect();
    positions.sort();
    assert_eq!(
        positions,
        vec![p(-4, -4), p(-4, 14), p(14, -4), p(14, 14)]
    );
    for (_, v) in g.vertices() {
        assert_eq!(v.owner(), Some(id));
    }
}

#[test]
fn an_obstacle_occludes_its_own_diagonals_but_not_its_outline() {
    let mut g = VisibilityGraph::new(4);
    g.register_obstacle(Rect::new(0, 0, 10, 10)).unwrap();

    assert!(linked(&g, p(-4, -4), p(14, -4)));
    assert!(linked(&g, p(14, -4), p(14, 14)));
    assert!(linked(&g, p(14, 14), p(-4, 14)));
    assert!(linked(&g, p(-4, 14), p(-4, -4)));
    assert!(!linked(&g, p(-4, -4), p(14, 14)));
    assert!(!linked(&g, p(14, -4), p(-4, 14)));
    assert_eq!(g.edge_count(), 4);
}

#[test]
fn distant_obstacles_see_each_other() {
    let mut g = VisibilityGraph::new(4);
    g.register_obstacle(Rect::new(0, 0, 10, 10)).unwrap();
    g.register_obstacle(Rect::new(100, 0, 10, 10)).unwrap();

    assert!(g.is_visible(p(14, -4), p(96, -4)));
    assert!(linked(&g, p(14, -4), p(96, -4)));
}

#[test]
fn registering_an_obstacle_severs_edges_it_blocks() {
    let mut g = VisibilityGraph::new(4);
    g.register_obstacle(Rect::new(0, 0, 10, 10)).unwrap();
    g.register_obstacle(Rect::new(100, 0, 10, 10)).unwrap();
    assert!(linked(&g, p(14, -4), p(96, -4)));

    g.register_obstacle(Rect::new(40, -20, 20, 40)).unwrap();
    assert!(!g.is_visible(p(14, -4), p(96, -4)));
    assert!(!linked(&g, p(14, -4), p(96, -4)));
}

#[test]
fn removing_an_obstacle_restores_the_corridor_it_blocked() {
    let mut g = VisibilityGraph::new(4);
    g.register_obstacle(Rect::new(0, 0, 10, 10)).unwrap();
    g.register_obstacle(Rect::new(100, 0, 10, 10)).unwrap();
    let middle = g.register_obstacle(Rect::new(40, -20, 20, 40)).unwrap();
    assert!(!linked(&g, p(14, -4), p(96, -4)));

    g.remove_obstacle(middle).unwrap();
    assert_eq!(g.vertex_count(), 8);
    assert!(linked(&g, p(14, -4), p(96, -4)));
}

#[test]
fn removing_an_unknown_obstacle_is_reported() {
    let mut g = VisibilityGraph::new(4);
    let id = g.register_obstacle(Rect::new(0, 0, 10, 10)).unwrap();
    g.remove_obstacle(id).unwrap();
    assert_eq!(g.remove_obstacle(id), Err(Error::UnknownObstacle(id)));
}

#[test]
fn updating_an_obstacle_keeps_its_id_and_moves_its_corners() {
    let mut g = VisibilityGraph::new(4);
    let id = g.register_obstacle(Rect::new(0, 0, 10, 10)).unwrap();
    g.update_obstacle(id, Rect::new(50, 50, 10, 10)).unwrap();

    let ob = g.obstacle(id).unwrap();
    assert_eq!(ob.bounds(), Rect::new(50, 50, 10, 10));
    assert_eq!(g.vertex_count(), 4);
    for (_, v) in g.vertices() {
        assert_eq!(v.owner(), Some(id));
    }
    let _ = vertex_at(&g, p(46, 46));
    let _ = vertex_at(&g, p(64, 64));
}

#[test]
fn updating_an_obstacle_leaves_unrelated_edges_alone() {
    let mut g = VisibilityGraph::new(4);
    g.register_obstacle(Rect::new(0, 0, 10, 10)).unwrap();
    g.register_obstacle(Rect::new(100, 0, 10, 10)).unwrap();
    let far = g.register_obstacle(Rect::new(0, 200, 10, 10)).unwrap();
    assert!(linked(&g, p(14, -4), p(96, -4)));

    g.update_obstacle(far, Rect::new(100, 200, 10, 10)).unwrap();
    assert!(linked(&g, p(14, -4), p(96, -4)));
}

#[test]
fn an_endpoint_inside_a_clearance_zone_is_rejected() {
    let mut g = VisibilityGraph::new(4);
    let id = g.register_obstacle(Rect::new(0, 0, 10, 10)).unwrap();
    assert_eq!(
        g.add_endpoint(p(5, 5)),
        Err(Error::EndpointInsideObstacle {
            x: 5,
            y: 5,
            obstacle: id
        })
    );
}

#[test]
fn an_endpoint_on_the_expanded_boundary_is_accepted() {
    let mut g = VisibilityGraph::new(4);
    g.register_obstacle(Rect::new(0, 0, 10, 10)).unwrap();
    let v = g.add_endpoint(p(-4, 0)).unwrap();
    assert!(g.vertex(v).is_some());
}

#[test]
fn endpoints_come_and_go_without_perturbing_the_graph() {
    let mut g = VisibilityGraph::new(4);
    g.register_obstacle(Rect::new(0, 0, 10, 10)).unwrap();
    let edges_before = g.edge_count();

    let v = g.add_endpoint(p(50, 5)).unwrap();
    assert!(!g.vertex(v).unwrap().neighbors().is_empty());
    assert_eq!(g.vertex_count(), 5);

    g.remove_endpoint(v);
    assert_eq!(g.vertex_count(), 4);
    assert_eq!(g.edge_count(), edges_before);
}

#[test]
fn visibility_is_blocked_through_a_clearance_zone() {
    let mut g = VisibilityGraph::new(4);
    g.register_obstacle(Rect::new(40, -10, 20, 20)).unwrap();
    assert!(!g.is_visible(p(0, 0), p(100, 0)));
    assert!(g.is_visible(p(0, 0), p(36, -14)));
    assert!(g.is_visible(p(36, -14), p(64, -14)));
}

#[test]
fn coincident_points_are_never_mutually_visible() {
    let g = VisibilityGraph::new(4);
    assert!(!g.is_visible(p(5, 5), p(5, 5)));
}
