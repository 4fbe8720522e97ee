use opflow::approx::{approx_eq_slice, KERNEL_REL_ERROR};
use opflow::cpu::CpuInfo;
use opflow::exec::Executor;
use opflow::graph::{Graph, NodeId, OpKind, OpParams, NodeState, TensorId};
use opflow::ops::math::exp_approx;
use opflow::tensors::{Layout, Tensor, TensorData};
use opflow::Error;

const ALPHA: f32 = 1.0;
const LAMBDA: f32 = 1.0507;

fn selu_graph(input: Vec<f32>) -> (Graph, TensorId, NodeId) {
    let n = input.len();
    let mut graph = Graph::new();
    let input = graph.add_tensor(Tensor::from_f32(vec![n], input));
    let output = graph.add_tensor(Tensor::zeros_f32(vec![n]));
    let node = graph.add_node(
        OpKind::Selu,
        OpParams::Selu { alpha: ALPHA, lambda: LAMBDA },
        input,
        output,
    );
    (graph, output, node)
}

/// The kernel formula, evaluated with the same exponential primitive the
/// kernels use. Positive inputs are exact; negative ones bit-match too.
fn selu_reference(xs: &[f32]) -> Vec<f32> {
    xs.iter()
        .map(|&x| {
            if x <= 0.0 { (exp_approx(x) - 1.0) * (ALPHA * LAMBDA) } else { x * LAMBDA }
        })
        .collect()
}

#[test]
fn test_end_to_end_selu() {
    let (mut graph, output, _) = selu_graph(vec![-2.0, 0.0, 1.0, 3.0]);
    Executor::new().run(&mut graph).unwrap();

    let got = graph.tensor(output).as_f32().unwrap();
    let want = [
        (f32::exp(-2.0) - 1.0) * ALPHA * LAMBDA, // ≈ -0.9086
        0.0,
        1.0507,
        3.1521,
    ];
    assert!(
        approx_eq_slice(got, &want, KERNEL_REL_ERROR),
        "got {got:?}, want {want:?}"
    );
}

#[test]
fn test_selu_states_advance() {
    let (mut graph, _, node) = selu_graph(vec![-1.0, 2.0]);
    assert_eq!(graph.node(node).state(), NodeState::Unresolved);

    let exec = Executor::new();
    exec.bind(&mut graph, node).unwrap();
    assert_eq!(graph.node(node).state(), NodeState::Bound);
    assert!(graph.node(node).kernel_name().is_some());

    exec.run_node(&mut graph, node).unwrap();
    assert_eq!(graph.node(node).state(), NodeState::Executed);

    // Stateless kernels may re-execute.
    exec.run_node(&mut graph, node).unwrap();
    assert_eq!(graph.node(node).state(), NodeState::Executed);
}

#[test]
fn test_executing_unresolved_node_is_fatal() {
    let (mut graph, _, node) = selu_graph(vec![1.0]);
    let err = Executor::new().run_node(&mut graph, node).unwrap_err();
    assert!(matches!(err, Error::Unresolved { .. }));
}

#[test]
fn test_determinism_across_core_counts() {
    // Large enough that an 8-core plan produces 8 chunks plus a tail, with
    // chunk boundaries that do not align to the SIMD group width.
    let xs: Vec<f32> = (0..100_003).map(|i| ((i % 17) as f32 - 8.0) * 0.25).collect();

    let mut outputs = Vec::new();
    for cores in [1, 8] {
        let (mut graph, output, _) = selu_graph(xs.clone());
        let exec = Executor::new().with_cpu(CpuInfo::probe().with_core_count(cores));
        exec.run(&mut graph).unwrap();
        outputs.push(graph.tensor(output).as_f32().unwrap().to_vec());
    }

    // Bit-identical, not merely close.
    assert_eq!(outputs[0], outputs[1]);
}

#[test]
fn test_every_element_is_processed_exactly_once() {
    // 1000 elements on 3 cores: three 333-element chunks plus a 1-element
    // tail. Any gap would leave the zero sentinel in the output; any overlap
    // would still write the same value, which coverage of the partition plan
    // tests separately.
    let xs: Vec<f32> = (0..1000).map(|i| (i as f32 - 500.0) * 0.1).collect();
    let want = selu_reference(&xs);

    let (mut graph, output, _) = selu_graph(xs);
    let exec = Executor::new().with_cpu(CpuInfo::probe().with_core_count(3));
    exec.run(&mut graph).unwrap();

    assert_eq!(graph.tensor(output).as_f32().unwrap(), want.as_slice());
}

#[test]
fn test_end_to_end_relu() {
    let mut graph = Graph::new();
    let input = graph.add_tensor(Tensor::from_f32(vec![5], vec![-3.0, -0.5, 0.0, 0.5, 3.0]));
    let output = graph.add_tensor(Tensor::zeros_f32(vec![5]));
    graph.add_node(OpKind::Relu, OpParams::None, input, output);

    Executor::new().run(&mut graph).unwrap();
    assert_eq!(graph.tensor(output).as_f32().unwrap(), &[0.0, 0.0, 0.0, 0.5, 3.0]);
}

#[test]
fn test_f16_node_has_no_kernel() {
    let mut graph = Graph::new();
    let input =
        graph.add_tensor(Tensor::new(vec![4], Layout::Nchw, TensorData::F16(vec![0u16; 4])));
    let output =
        graph.add_tensor(Tensor::new(vec![4], Layout::Nchw, TensorData::F16(vec![0u16; 4])));
    let node = graph.add_node(OpKind::Relu, OpParams::None, input, output);

    let err = Executor::new().bind(&mut graph, node).unwrap_err();
    assert!(matches!(err, Error::UnsupportedConfiguration { .. }));
}

#[test]
fn test_mismatched_extents_do_not_bind() {
    let mut graph = Graph::new();
    let input = graph.add_tensor(Tensor::from_f32(vec![4], vec![1.0; 4]));
    let output = graph.add_tensor(Tensor::zeros_f32(vec![3]));
    let node = graph.add_node(OpKind::Relu, OpParams::None, input, output);

    assert!(Executor::new().bind(&mut graph, node).is_err());
}

#[test]
fn test_non_finite_selu_params_do_not_bind() {
    let mut graph = Graph::new();
    let input = graph.add_tensor(Tensor::from_f32(vec![4], vec![1.0; 4]));
    let output = graph.add_tensor(Tensor::zeros_f32(vec![4]));
    let node = graph.add_node(
        OpKind::Selu,
        OpParams::Selu { alpha: f32::NAN, lambda: LAMBDA },
        input,
        output,
    );

    let err = Executor::new().bind(&mut graph, node).unwrap_err();
    assert!(matches!(err, Error::UnsupportedConfiguration { .. }));
}

#[test]
fn test_in_place_node_is_rejected_at_execution() {
    let mut graph = Graph::new();
    let buf = graph.add_tensor(Tensor::from_f32(vec![4], vec![1.0; 4]));
    let node = graph.add_node(OpKind::Relu, OpParams::None, buf, buf);

    let exec = Executor::new();
    exec.bind(&mut graph, node).unwrap();
    let err = exec.run_node(&mut graph, node).unwrap_err();
    assert!(matches!(err, Error::InvalidParameter { .. }));
}

#[test]
fn test_zero_element_node_is_a_no_op() {
    let mut graph = Graph::new();
    let input = graph.add_tensor(Tensor::from_f32(vec![0], vec![]));
    let output = graph.add_tensor(Tensor::zeros_f32(vec![0]));
    let node = graph.add_node(OpKind::Relu, OpParams::None, input, output);

    let exec = Executor::new();
    exec.bind(&mut graph, node).unwrap();
    exec.run_node(&mut graph, node).unwrap();
    assert_eq!(graph.node(node).state(), NodeState::Executed);
}

#[test]
fn test_binding_is_stable_across_runs() {
    let (mut graph, _, node) = selu_graph(vec![-1.0, 1.0, 2.0, -2.0]);
    let exec = Executor::new();
    exec.bind(&mut graph, node).unwrap();
    let first = graph.node(node).kernel_name();

    exec.run_node(&mut graph, node).unwrap();
    exec.bind(&mut graph, node).unwrap(); // must keep the existing binding
    assert_eq!(graph.node(node).kernel_name(), first);
}
