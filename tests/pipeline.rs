use linrep::prelude::*;

const DIAGONAL: &str = "msd_2 msd_2\n\
    0 0\n\
    0 0 -> 0\n\
    1 1 -> 1\n\
    \n\
    1 1\n\
    0 0 -> 1\n";

#[test_log::test]
fn walnut_to_matrix_export() {
    let mut mapper = LabelMapper::new();
    let dfa = walnut::read(DIAGONAL.as_bytes(), &mut mapper).unwrap();
    let (a, proj) = dfa_count(&dfa, &mapper, &[0, 1]).unwrap();

    assert_eq!(a.state_count(), 2);
    assert_eq!(a.initial_weight(0), weight::from_int(1));
    assert_eq!(a.final_weight(1), weight::from_int(1));

    let rep = LinearRep::from_wfa(&a);
    let mut buf = Vec::new();
    let stats = rep.write(&proj, &mut buf, true).unwrap();
    assert_eq!(
        String::from_utf8(buf).unwrap(),
        "lambda = [1, 0]\n\
         \n\
         mu[0 0] = [\n\
         [1, 0],\n\
         [0, 1]\n\
         ]\n\
         \n\
         mu[1 1] = [\n\
         [0, 1],\n\
         [0, 0]\n\
         ]\n\
         \n\
         rho = [0, 1]\n"
    );
    assert_eq!(stats.min, weight::from_int(0));
    assert_eq!(stats.max, weight::from_int(1));
}

#[test_log::test]
fn export_import_round_trip_preserves_evaluation() {
    let mut mapper = LabelMapper::new();
    let dfa = walnut::read(DIAGONAL.as_bytes(), &mut mapper).unwrap();
    let (a, proj) = dfa_count(&dfa, &mapper, &[0, 1]).unwrap();
    let reduced = reduce(&a);

    let rep = LinearRep::from_wfa(&reduced);
    let mut buf = Vec::new();
    rep.write(&proj, &mut buf, true).unwrap();

    let mut reread = LabelMapper::new();
    let back = LinearRep::parse(buf.as_slice(), &mut reread).unwrap();

    let z = proj.id_of(&[0, 0]).unwrap();
    let o = proj.id_of(&[1, 1]).unwrap();
    let zz = reread.id_of(&[0, 0]).unwrap();
    let oo = reread.id_of(&[1, 1]).unwrap();

    let words: [(Vec<LabelId>, Vec<LabelId>); 5] = [
        (vec![], vec![]),
        (vec![o], vec![oo]),
        (vec![z, o], vec![zz, oo]),
        (vec![z, o, z, z], vec![zz, oo, zz, zz]),
        (vec![o, o], vec![oo, oo]),
    ];
    for (w, ww) in words {
        assert_eq!(a.eval(&w), back.eval(&ww));
    }
}

#[test_log::test]
fn difference_pipeline_runs_end_to_end() {
    let mut mapper = LabelMapper::new();
    let dfa = walnut::read(DIAGONAL.as_bytes(), &mut mapper).unwrap();
    let (a, proj) = dfa_count(&dfa, &mapper, &[0, 1]).unwrap();
    let z = proj.id_of(&[0, 0]).unwrap();
    let o = proj.id_of(&[1, 1]).unwrap();

    // subtracting the automaton from itself must reduce away entirely
    let cancelled = reduce(&sum(&a, &opposite(&a)));
    assert_eq!(cancelled.state_count(), 0);

    // the full view recipe stays language-equivalent to its unreduced form
    let unreduced = gview(&prefix_absorb(&a, &[z]), z);
    let recipe = fromthere(&a, z, &[z], None);
    for word in [vec![], vec![o], vec![z, o], vec![o, z], vec![z, z, o]] {
        assert_eq!(recipe.eval(&word), unreduced.eval(&word));
    }

    // co-tracking against a companion multiplies pointwise
    let joint = fromthere(&a, z, &[z], Some(&a));
    let conditioned = prefix_absorb(&a, &[z]);
    for word in [vec![], vec![o], vec![z, o]] {
        assert_eq!(
            joint.eval(&word),
            unreduced.eval(&word) * conditioned.eval(&word)
        );
    }
}
